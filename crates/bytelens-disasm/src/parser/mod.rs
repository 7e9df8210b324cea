use bytelens_core::{CodeObject, Error, Result};

use crate::opcodes::OpcodeTable;

/// Every instruction is one opcode byte followed by one operand byte.
pub const INSTRUCTION_WIDTH: usize = 2;

/// Decoded instruction from bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub opcode: u8,
    /// Raw operand merged with any pending extension; `None` below the
    /// argument threshold.
    pub arg: Option<u32>,
}

/// Extension accumulator carried between instructions.
///
/// Each extension prefix shifts the whole merged operand left by 8, so a
/// chain of prefixes builds operands wider than 16 bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedArg {
    pending: u32,
}

impl ExtendedArg {
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Merges `low` with the pending high bits and updates the accumulator.
    /// Returns `None` when a further extension would not fit in 32 bits.
    pub fn merge(&mut self, low: u8, extends: bool) -> Option<u32> {
        let arg = self.pending | u32::from(low);
        self.pending = 0;
        if extends {
            if arg > 0x00ff_ffff {
                return None;
            }
            self.pending = arg << 8;
        }
        Some(arg)
    }
}

/// Lazy iterator over the instructions of one unit.
///
/// The byte length is validated up front; iteration stops after the first
/// error.
#[derive(Debug, Clone)]
pub struct InstructionStream<'a> {
    unit: &'a str,
    code: &'a [u8],
    table: &'a OpcodeTable,
    pos: usize,
    ext: ExtendedArg,
    done: bool,
}

impl<'a> InstructionStream<'a> {
    pub fn new(unit: &'a str, code: &'a [u8], table: &'a OpcodeTable) -> Result<Self> {
        if code.len() % INSTRUCTION_WIDTH != 0 {
            return Err(Error::MalformedStream {
                unit: unit.to_string(),
                offset: code.len() - code.len() % INSTRUCTION_WIDTH,
                reason: format!(
                    "length {} is not a multiple of {}",
                    code.len(),
                    INSTRUCTION_WIDTH
                ),
            });
        }
        Ok(Self {
            unit,
            code,
            table,
            pos: 0,
            ext: ExtendedArg::default(),
            done: false,
        })
    }

    pub fn for_unit(unit: &'a CodeObject, table: &'a OpcodeTable) -> Result<Self> {
        Self::new(&unit.name, &unit.code, table)
    }
}

impl Iterator for InstructionStream<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.code.len() {
            return None;
        }
        let offset = self.pos;
        let opcode = self.code[offset];
        let low = self.code[offset + 1];
        self.pos += INSTRUCTION_WIDTH;

        let arg = if self.table.takes_argument(opcode) {
            match self.ext.merge(low, opcode == self.table.extended_arg()) {
                Some(arg) => Some(arg),
                None => {
                    self.done = true;
                    return Some(Err(Error::MalformedStream {
                        unit: self.unit.to_string(),
                        offset,
                        reason: "extended operand exceeds 32 bits".to_string(),
                    }));
                }
            }
        } else {
            None
        };
        Some(Ok(Instruction { offset, opcode, arg }))
    }
}

/// Decodes raw bytecode into a list of instructions.
pub fn parse_instructions(code: &[u8], table: &OpcodeTable) -> Result<Vec<Instruction>> {
    InstructionStream::new("<bytes>", code, table)?.collect()
}
