//! Parameters of the generated history and tools to reason about its size
//!
//! Every level wraps the previous tree in a tree of `FANOUT` identical
//! subdirectories and commits it, so after `LEVELS` levels a checkout would
//! contain `FANOUT^LEVELS` copies of the seed tree while the object store only
//! grew by `2 * LEVELS` objects.

pub mod expansion;
pub mod level;

use crate::artifacts::objects::commit::Author;

/// Number of fan-out levels stacked on top of the seed commit
pub const LEVELS: usize = 32;

/// Number of entries in every generated tree
pub const FANOUT: usize = 16;

pub const AUTHOR_NAME: &str = "treebomb";
pub const AUTHOR_EMAIL: &str = "treebomb@localhost";

/// Name of the `i`-th entry of a generated tree: a lowercase hex digit
pub fn hex_label(i: usize) -> String {
    format!("{:x}", i)
}

/// Identity used for both author and committer of generated commits
pub fn identity() -> Author {
    Author::at_epoch(AUTHOR_NAME.to_string(), AUTHOR_EMAIL.to_string())
}

/// Message of the commit that adds level `level_index` (zero-based)
pub fn level_message(level_index: usize) -> String {
    format!("Add level {}", level_index + 1)
}
