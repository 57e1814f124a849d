// Identifier lookup at a 1-indexed row/column

use crate::editing::placement::read_source;
use crate::error::Result;
use std::path::Path;

/// Identifier characters: `[A-Za-z0-9_$]`
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Return the identifier covering (`row`, `col`), both 1-indexed, with the
/// column counted in characters. `None` when the row or column is out of
/// range or the character there is not an identifier character.
pub fn symbol_at<S: AsRef<str>>(lines: &[S], row: usize, col: usize) -> Option<String> {
    if row == 0 || col == 0 {
        return None;
    }
    let line = lines.get(row - 1)?.as_ref();
    let chars: Vec<char> = line.chars().collect();

    let index = col - 1;
    if !is_identifier_char(*chars.get(index)?) {
        return None;
    }

    let start = chars[..index]
        .iter()
        .rposition(|&c| !is_identifier_char(c))
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let end = chars[index..]
        .iter()
        .position(|&c| !is_identifier_char(c))
        .map(|pos| index + pos)
        .unwrap_or(chars.len());

    Some(chars[start..end].iter().collect())
}

/// Read `path` and look up the identifier at (`row`, `col`). I/O failures
/// are errors; an invalid position is `Ok(None)`.
pub fn symbol_at_path(path: &Path, row: usize, col: usize) -> Result<Option<String>> {
    let source = read_source(path)?;
    Ok(symbol_at(&source.lines, row, col))
}
