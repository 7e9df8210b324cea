use std::borrow::Cow;
use std::fmt;

use bytelens_core::{CodeObject, LineNumber};

use crate::resolver::ArgValue;

/// Marker shown in front of offsets that are jump destinations.
pub const JUMP_MARKER: &str = ">>";

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionRecord {
    pub offset: usize,
    pub opcode: u8,
    pub mnemonic: Cow<'static, str>,
    pub arg: Option<u32>,
    pub value: Option<ArgValue>,
    /// Set only when a new source line starts at this offset.
    pub line: Option<LineNumber>,
    pub is_jump_target: bool,
}

impl InstructionRecord {
    /// Line number worth printing; line 0 shows blank.
    fn visible_line(&self) -> Option<LineNumber> {
        self.line.filter(|line| *line != 0)
    }

    /// Whether a blank separator goes before this record.
    pub fn starts_new_line(&self) -> bool {
        self.visible_line().is_some() && self.offset != 0
    }
}

impl fmt::Display for InstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.visible_line().map(|l| l.to_string()).unwrap_or_default();
        let marker = if self.is_jump_target { JUMP_MARKER } else { "" };
        let arg = self.arg.map(|a| a.to_string()).unwrap_or_default();
        let value = self
            .value
            .as_ref()
            .map(|v| format!("({})", v))
            .unwrap_or_default();
        write!(
            f,
            "{:<4}{:<2}{:>5} {:<22} {:>3} {}",
            line, marker, self.offset, self.mnemonic, arg, value
        )
    }
}

/// Receives the listing as it is produced.
///
/// Units arrive parent first; every `begin_unit` is followed by that unit's
/// records in ascending offset order.
pub trait ListingSink {
    fn begin_unit(&mut self, unit: &CodeObject, depth: usize);
    fn record(&mut self, record: InstructionRecord);
}

/// Listing of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Representation of the unit, e.g. `<code object f, file "x.py", line 3>`.
    pub unit: String,
    pub depth: usize,
    pub records: Vec<InstructionRecord>,
}

/// In-memory listing of a unit and all of its nested units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub sections: Vec<Section>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &InstructionRecord> {
        self.sections.iter().flat_map(|s| s.records.iter())
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl ListingSink for Listing {
    fn begin_unit(&mut self, unit: &CodeObject, depth: usize) {
        self.sections.push(Section {
            unit: unit.to_string(),
            depth,
            records: Vec::new(),
        });
    }

    fn record(&mut self, record: InstructionRecord) {
        match self.sections.last_mut() {
            Some(section) => section.records.push(record),
            None => self.sections.push(Section {
                unit: String::new(),
                depth: 0,
                records: vec![record],
            }),
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            if section.depth > 0 {
                writeln!(f)?;
                writeln!(f, "Disassembly of {}:", section.unit)?;
                writeln!(f)?;
            }
            for record in &section.records {
                if record.starts_new_line() {
                    writeln!(f)?;
                }
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}
