use std::env;

use anyhow::{Context, Result};
use bytelens_disasm::{
    loader::{Container, HeaderFormat, JsonDeserializer},
    Disassembler, DisassemblerConfig, CPYTHON_38,
};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <UNIT_FILE> [header-size: 8|12|16]", args[0]);
        std::process::exit(1);
    }
    let format = match args.get(2).map(String::as_str) {
        Some("8") => HeaderFormat::Legacy,
        Some("12") => HeaderFormat::Sized,
        Some("16") | None => HeaderFormat::Flagged,
        Some(other) => anyhow::bail!("tamanho de cabeçalho inválido: {}", other),
    };

    let mut config = DisassemblerConfig::default();
    if let Ok(depth) = env::var("BYTELENS_MAX_DEPTH") {
        config.max_depth = depth
            .parse()
            .with_context(|| format!("BYTELENS_MAX_DEPTH inválido: {}", depth))?;
    }

    let unit = Container::new(format, JsonDeserializer)
        .load_file(&args[1])
        .with_context(|| format!("falha ao carregar {}", args[1]))?;
    info!("Unidade {} carregada ({} bytes)", unit.name, unit.code.len());

    let listing = Disassembler::new(&CPYTHON_38, config).disassemble(&unit)?;
    print!("{}", listing);
    Ok(())
}
