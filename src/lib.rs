//! importpick - pick an import statement from your project and insert it
//!
//! A search subprocess (ripgrep) streams candidate import lines through a
//! deduplicating, relevance-ranking stage into a fuzzy selector (fzf). The
//! chosen line is inserted at the top of the target file's import block.

pub mod cli;
pub mod config;
pub mod editing;
pub mod error;
pub mod project;
pub mod ranking;
pub mod session;

pub use error::{ImportPickError, Result};
