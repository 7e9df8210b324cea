use std::collections::HashSet;

use bytelens_core::{CodeObject, Result};

use crate::{
    opcodes::{OpcodeCategory, OpcodeTable},
    parser::{Instruction, InstructionStream, INSTRUCTION_WIDTH},
};

/// Jump destinations of a unit in order of first discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTargets {
    order: Vec<usize>,
    seen: HashSet<usize>,
}

impl JumpTargets {
    /// Returns `false` if the offset was already recorded.
    pub fn insert(&mut self, offset: usize) -> bool {
        if !self.seen.insert(offset) {
            return false;
        }
        self.order.push(offset);
        true
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.seen.contains(&offset)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Destination of a jump instruction, `None` for anything else.
pub fn jump_destination(table: &OpcodeTable, ins: &Instruction) -> Option<usize> {
    let arg = ins.arg? as usize;
    match table.category(ins.opcode) {
        OpcodeCategory::JumpRelative => Some(ins.offset + INSTRUCTION_WIDTH + arg),
        OpcodeCategory::JumpAbsolute => Some(arg),
        _ => None,
    }
}

/// Scans the unit once and collects every jump destination.
pub fn find_jump_targets(unit: &CodeObject, table: &OpcodeTable) -> Result<JumpTargets> {
    let mut targets = JumpTargets::default();
    for ins in InstructionStream::for_unit(unit, table)? {
        if let Some(dest) = jump_destination(table, &ins?) {
            targets.insert(dest);
        }
    }
    Ok(targets)
}
