//! Target-file operations: symbol lookup, target parsing, import placement

pub mod placement;
pub mod symbol;
pub mod target;

pub use placement::{
    add_import, contains_line, find_insertion_index, insert, read_source, write_source,
    InsertOutcome, SourceFile,
};
pub use symbol::{symbol_at, symbol_at_path};
pub use target::{Position, TargetSpec};
