// `path[:row:col]` target arguments

use crate::error::{ImportPickError, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// 1-indexed cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Target file plus optional cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub path: PathBuf,
    pub position: Option<Position>,
}

impl TargetSpec {
    /// Parse `src/a.ts` or `src/a.ts:12:7`. The suffix is recognised only
    /// when both parts are integers; anything else is part of the path.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(ImportPickError::InvalidTarget("empty target".to_string()));
        }

        let mut parts = text.rsplitn(3, ':');
        let last = parts.next();
        let middle = parts.next();
        let head = parts.next();

        if let (Some(col), Some(row), Some(path)) = (last, middle, head) {
            if let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>()) {
                if path.is_empty() {
                    return Err(ImportPickError::InvalidTarget(format!(
                        "missing file path in '{}'",
                        text
                    )));
                }
                if row == 0 || col == 0 {
                    return Err(ImportPickError::InvalidTarget(format!(
                        "row and column are 1-indexed in '{}'",
                        text
                    )));
                }
                return Ok(Self {
                    path: PathBuf::from(path),
                    position: Some(Position { row, col }),
                });
            }
        }

        Ok(Self {
            path: PathBuf::from(text),
            position: None,
        })
    }
}

impl FromStr for TargetSpec {
    type Err = ImportPickError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
