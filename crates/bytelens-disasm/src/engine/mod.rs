use std::sync::Arc;

use bytelens_core::{CodeObject, Constant, Error, Result};
use tracing::{debug, trace};

use crate::{
    labels::find_jump_targets,
    linetable::find_line_starts,
    listing::{InstructionRecord, Listing, ListingSink},
    opcodes::{OpcodeTable, CPYTHON_38},
    parser::InstructionStream,
    resolver::resolve_operand,
};

/// Configuração do desmontador
#[derive(Debug, Clone)]
pub struct DisassemblerConfig {
    /// Profundidade máxima de unidades aninhadas
    pub max_depth: usize,
    /// Desmonta também as unidades encontradas no pool de constantes
    pub recurse_nested: bool,
}

impl Default for DisassemblerConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            recurse_nested: true,
        }
    }
}

/// Drives decoding, line mapping, jump marking and operand resolution for a
/// unit and, depth first, for every unit nested in its constants.
#[derive(Debug, Clone)]
pub struct Disassembler<'t> {
    table: &'t OpcodeTable,
    config: DisassemblerConfig,
}

impl Default for Disassembler<'static> {
    fn default() -> Self {
        Self::new(&CPYTHON_38, DisassemblerConfig::default())
    }
}

impl<'t> Disassembler<'t> {
    pub fn new(table: &'t OpcodeTable, config: DisassemblerConfig) -> Self {
        Self { table, config }
    }

    /// Disassembles `unit` into an in-memory listing.
    pub fn disassemble(&self, unit: &CodeObject) -> Result<Listing> {
        let mut listing = Listing::new();
        self.run(unit, &mut listing)?;
        Ok(listing)
    }

    /// Streams the listing of `unit` into `sink`.
    ///
    /// Stops at the first error; whatever was already pushed stays in the sink.
    pub fn run(&self, unit: &CodeObject, sink: &mut dyn ListingSink) -> Result<()> {
        self.disassemble_unit(unit, sink, 0)
    }

    /// Like [`run`](Self::run) for a constant; anything but a nested unit is
    /// rejected before decoding starts.
    pub fn run_value(&self, value: &Constant, sink: &mut dyn ListingSink) -> Result<()> {
        match value.as_code() {
            Some(unit) => self.run(unit, sink),
            None => Err(Error::UnsupportedInput(format!(
                "expected a code object, got {}",
                value.repr()
            ))),
        }
    }

    fn disassemble_unit(
        &self,
        unit: &CodeObject,
        sink: &mut dyn ListingSink,
        depth: usize,
    ) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::NestingTooDeep {
                unit: unit.name.clone(),
                max_depth: self.config.max_depth,
            });
        }
        debug!(unit = %unit.name, depth, bytes = unit.code.len(), "disassembling unit");

        let line_starts = find_line_starts(unit);
        let targets = find_jump_targets(unit, self.table)?;
        let stream = InstructionStream::for_unit(unit, self.table)?;

        sink.begin_unit(unit, depth);
        let mut nested: Vec<Arc<CodeObject>> = Vec::new();
        for ins in stream {
            let ins = ins?;
            let value = resolve_operand(ins.offset, unit, ins.opcode, ins.arg, self.table)?;
            if let Some(code) = value.as_ref().and_then(|v| v.nested_unit()) {
                trace!(parent = %unit.name, nested = %code.name, offset = ins.offset, "found nested unit");
                nested.push(Arc::clone(code));
            }
            sink.record(InstructionRecord {
                offset: ins.offset,
                opcode: ins.opcode,
                mnemonic: self.table.mnemonic(ins.opcode),
                arg: ins.arg,
                value,
                line: line_starts.get(&ins.offset).copied(),
                is_jump_target: targets.contains(ins.offset),
            });
        }
        debug!(unit = %unit.name, nested = nested.len(), jump_targets = targets.len(), "unit done");

        if !self.config.recurse_nested {
            return Ok(());
        }
        for child in &nested {
            self.disassemble_unit(child, sink, depth + 1)?;
        }
        Ok(())
    }
}

/// Disassembles `unit` with the built-in table and default configuration.
pub fn disassemble(unit: &CodeObject) -> Result<Listing> {
    Disassembler::default().disassemble(unit)
}
