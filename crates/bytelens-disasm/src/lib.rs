//! Bytelens Disasm
//!
//! Turns the instruction stream of a compiled unit into an annotated listing:
//! source lines, jump-target markers and resolved operands, recursing into
//! nested units found among the constants.

pub mod opcodes;
pub mod parser;
pub mod linetable;
pub mod labels;
pub mod resolver;
pub mod listing;
pub mod engine;
pub mod loader;

pub use engine::{disassemble, Disassembler, DisassemblerConfig};
pub use listing::{InstructionRecord, Listing, ListingSink, Section};
pub use opcodes::{OpcodeCategory, OpcodeTable, CPYTHON_38};
pub use resolver::ArgValue;
