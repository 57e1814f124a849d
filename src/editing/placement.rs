//! Import placement: where a new import line goes, and the file rewrite
//!
//! The target file is read fresh for every operation and written back as
//! a whole. Existing lines are never reordered or modified; exactly one
//! line is inserted.

use crate::error::{ImportPickError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^import(?:[\s{*'"]|$)"#).expect("valid import regex"));

static DIRECTIVE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:'use [\w ]+'|"use [\w ]+");?$"#).expect("valid directive regex")
});

/// Result of an insertion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Line inserted at this 0-indexed position
    Inserted { index: usize },
    /// A trimmed-equal line already exists; nothing was written
    AlreadyPresent,
}

const BOM: char = '\u{feff}';

/// In-memory copy of a source file. Each line keeps its own terminator
/// (`"\n"`, `"\r\n"`, or `""` for an unterminated last line) so untouched
/// lines render byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Line contents without terminators (and without the BOM)
    pub lines: Vec<String>,
    endings: Vec<&'static str>,
    bom: bool,
}

impl SourceFile {
    pub fn parse(content: &str) -> Self {
        let (bom, content) = match content.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, content),
        };

        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for piece in content.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = piece.strip_suffix("\r\n") {
                (line, "\r\n")
            } else if let Some(line) = piece.strip_suffix('\n') {
                (line, "\n")
            } else {
                (piece, "")
            };
            lines.push(line.to_string());
            endings.push(ending);
        }

        Self {
            lines,
            endings,
            bom,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }

    /// `"\r\n"` when most terminated lines use it, else `"\n"`
    fn dominant_ending(&self) -> &'static str {
        let crlf = self.endings.iter().filter(|e| **e == "\r\n").count();
        let lf = self.endings.iter().filter(|e| **e == "\n").count();
        if crlf > lf {
            "\r\n"
        } else {
            "\n"
        }
    }

    pub fn contains_line(&self, line: &str) -> bool {
        contains_line(&self.lines, line)
    }

    /// Insert at the computed position and return it. Does not check for
    /// duplicates.
    pub fn insert(&mut self, new_line: &str) -> usize {
        let ending = self.dominant_ending();
        let index = find_insertion_index(&self.lines);

        // appending after an unterminated last line: that line needs a break
        if index == self.lines.len() {
            if let Some(last) = self.endings.last_mut() {
                if last.is_empty() {
                    *last = ending;
                }
            }
        }

        self.lines.insert(index, new_line.to_string());
        self.endings.insert(index, ending);
        index
    }
}

/// Read `path` as UTF-8 text
pub fn read_source(path: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(path).map_err(|e| ImportPickError::Io {
        source: e,
        context: format!("Failed to read {:?}", path),
    })?;
    Ok(SourceFile::parse(&content))
}

/// Write `source` back to `path` in full
pub fn write_source(path: &Path, source: &SourceFile) -> Result<()> {
    std::fs::write(path, source.render()).map_err(|e| ImportPickError::Io {
        source: e,
        context: format!("Failed to write {:?}", path),
    })
}

/// Exact trimmed-text match against every existing line
pub fn contains_line<S: AsRef<str>>(lines: &[S], line: &str) -> bool {
    let needle = line.trim();
    lines.iter().any(|existing| existing.as_ref().trim() == needle)
}

pub fn is_import_line(line: &str) -> bool {
    IMPORT_LINE.is_match(line.trim())
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

/// Shebang or a directive such as `'use strict';`
fn is_prologue_line(trimmed: &str) -> bool {
    trimmed.starts_with("#!") || DIRECTIVE_LINE.is_match(trimmed)
}

/// Index at which a new import is inserted: the first import statement
/// after the leading blank/comment/prologue lines, else the first
/// substantive line, else the end of the file.
pub fn find_insertion_index<S: AsRef<str>>(lines: &[S]) -> usize {
    let mut in_block_comment = false;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.as_ref().trim();

        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if is_comment_line(trimmed) {
            if trimmed.starts_with("/*") && !trimmed.contains("*/") {
                in_block_comment = true;
            }
            continue;
        }
        if is_prologue_line(trimmed) {
            continue;
        }

        if is_import_line(trimmed) {
            tracing::debug!("Inserting before existing import at line {}", index + 1);
        } else {
            tracing::debug!("No import block, inserting before line {}", index + 1);
        }
        return index;
    }

    lines.len()
}

/// Splice `new_line` into a copy of `lines` at the insertion index
pub fn insert<S: AsRef<str>>(lines: &[S], new_line: &str) -> Vec<String> {
    let index = find_insertion_index(lines);
    let mut out: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
    out.insert(index, new_line.to_string());
    out
}

/// Insert `new_line` into the file at `path` unless a trimmed-equal line
/// is already there. With `dry_run` the position is computed but nothing
/// is written.
pub fn add_import(path: &Path, new_line: &str, dry_run: bool) -> Result<InsertOutcome> {
    let mut source = read_source(path)?;

    if source.contains_line(new_line) {
        tracing::info!("{:?} already contains {:?}", path, new_line.trim());
        return Ok(InsertOutcome::AlreadyPresent);
    }

    let index = source.insert(new_line);
    if dry_run {
        tracing::info!("Dry run: would insert at line {}", index + 1);
    } else {
        write_source(path, &source)?;
        tracing::info!("Inserted import into {:?} at line {}", path, index + 1);
    }

    Ok(InsertOutcome::Inserted { index })
}
