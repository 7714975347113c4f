/// Converts a 1-based line and 1-based byte column into a byte offset.
///
/// Columns count bytes, the way clang reports them. A column one past the
/// last character of a line is accepted (it addresses the newline).
pub fn byte_offset_from_line_col(
    source: &str,
    line: u32,
    column: u32,
) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let line_idx = (line - 1) as usize;
    let mut lines = source.split('\n');
    let mut byte_offset = 0usize;

    for _ in 0..line_idx {
        let line = lines.next()?;
        byte_offset += line.len() + 1;
    }

    let line = lines.next()?;
    let col_idx = (column - 1) as usize;
    if col_idx > line.len() {
        return None;
    }

    Some(byte_offset + col_idx)
}

/// Converts a byte offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end of the buffer clamp to its last position.
pub fn line_col_from_byte_offset(
    source: &str,
    byte_offset: usize,
) -> (u32, u32) {
    let offset = byte_offset.min(source.len());
    let prefix = &source.as_bytes()[..offset];
    let line = prefix.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
    let line_start = prefix.iter().rposition(|&b| b == b'\n').map(|idx| idx + 1).unwrap_or(0);
    (line, (offset - line_start) as u32 + 1)
}

#[cfg(test)]
#[path = "../../tests/src/source/text_pos_tests.rs"]
mod tests;
