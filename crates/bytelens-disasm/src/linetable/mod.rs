use std::collections::BTreeMap;

use bytelens_core::{CodeObject, LineNumber};
use tracing::warn;

/// Maps bytecode offsets to the source line that starts there.
///
/// The table is a sequence of `(byte_increment, line_increment)` pairs; the
/// line increment is a signed byte. Offset 0 always maps to `first_line`.
pub fn decode_line_table(table: &[u8], first_line: LineNumber) -> BTreeMap<usize, LineNumber> {
    let mut offset = 0usize;
    let mut line = first_line;
    let mut starts = BTreeMap::new();
    starts.insert(offset, line);

    for pair in table.chunks_exact(2) {
        offset += pair[0] as usize;
        line += LineNumber::from(pair[1] as i8);
        starts.insert(offset, line);
    }
    starts
}

/// Line starts for a unit.
pub fn find_line_starts(unit: &CodeObject) -> BTreeMap<usize, LineNumber> {
    if unit.line_table.len() % 2 != 0 {
        warn!(
            unit = %unit.name,
            len = unit.line_table.len(),
            "line table has a dangling byte; ignoring it"
        );
    }
    decode_line_table(&unit.line_table, unit.first_line)
}
