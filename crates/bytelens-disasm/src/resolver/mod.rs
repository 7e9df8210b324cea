use std::fmt;
use std::sync::Arc;

use bytelens_core::{CodeObject, Constant, Error, Result, TableKind};

use crate::{
    labels::jump_destination,
    opcodes::{OpcodeCategory, OpcodeTable},
    parser::Instruction,
};

/// Resolved meaning of an instruction's raw operand.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Constant shown by value (numbers, tuples, nested units...).
    Constant(Constant),
    /// Printable form of a text or null constant.
    Repr(String),
    Name(String),
    Local(String),
    Free(String),
    Compare(&'static str),
    /// Destination offset of a relative jump.
    JumpTarget(usize),
}

impl ArgValue {
    /// Nested unit carried by a constant load, if any.
    pub fn nested_unit(&self) -> Option<&Arc<CodeObject>> {
        match self {
            ArgValue::Constant(c) => c.as_code(),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Constant(c) => write!(f, "{}", c),
            ArgValue::Repr(s) => write!(f, "{}", s),
            ArgValue::Name(n) | ArgValue::Local(n) | ArgValue::Free(n) => write!(f, "{}", n),
            ArgValue::Compare(op) => write!(f, "{}", op),
            ArgValue::JumpTarget(dest) => write!(f, "to {}", dest),
        }
    }
}

fn lookup<'u, T>(
    unit: &CodeObject,
    offset: usize,
    table: TableKind,
    items: &'u [T],
    index: u32,
) -> Result<&'u T> {
    items.get(index as usize).ok_or_else(|| Error::IndexOutOfRange {
        unit: unit.name.clone(),
        offset,
        table,
        index,
        len: items.len(),
    })
}

/// Looks up the value an operand refers to in the unit's tables.
///
/// Returns `Ok(None)` when the opcode has no operand or its category carries
/// no lookup (plain and absolute-jump opcodes).
pub fn resolve_operand(
    offset: usize,
    unit: &CodeObject,
    opcode: u8,
    arg: Option<u32>,
    table: &OpcodeTable,
) -> Result<Option<ArgValue>> {
    let Some(index) = arg else {
        return Ok(None);
    };
    let value = match table.category(opcode) {
        OpcodeCategory::Const => {
            match lookup(unit, offset, TableKind::Constants, &unit.constants, index)? {
                c @ (Constant::Str(_) | Constant::None) => ArgValue::Repr(c.repr()),
                c => ArgValue::Constant(c.clone()),
            }
        }
        OpcodeCategory::Name => {
            ArgValue::Name(lookup(unit, offset, TableKind::Names, &unit.names, index)?.clone())
        }
        OpcodeCategory::JumpRelative => {
            let ins = Instruction { offset, opcode, arg };
            match jump_destination(table, &ins) {
                Some(dest) => ArgValue::JumpTarget(dest),
                None => return Ok(None),
            }
        }
        OpcodeCategory::Local => ArgValue::Local(
            lookup(unit, offset, TableKind::LocalNames, &unit.local_names, index)?.clone(),
        ),
        OpcodeCategory::Compare => ArgValue::Compare(*lookup(
            unit,
            offset,
            TableKind::CompareOps,
            table.compare_ops(),
            index,
        )?),
        OpcodeCategory::Free => match unit.cell_or_free_name(index as usize) {
            Some(name) => ArgValue::Free(name.to_string()),
            None => {
                return Err(Error::IndexOutOfRange {
                    unit: unit.name.clone(),
                    offset,
                    table: TableKind::CellAndFreeNames,
                    index,
                    len: unit.cell_and_free_len(),
                })
            }
        },
        OpcodeCategory::JumpAbsolute | OpcodeCategory::Plain => return Ok(None),
    };
    Ok(Some(value))
}
