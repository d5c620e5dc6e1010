//! Loose-object tree bomb generator
//!
//! Writes directly into an existing repository's `.git` directory to grow a
//! linear commit history whose trees fan out exponentially while each level
//! adds only one tree and one commit to the object store.
//!
//! - `areas`: object database, references and the repository handle
//! - `artifacts`: object types, branch names and the bomb parameters
//! - `commands`: operations on a repository

pub mod areas;
pub mod artifacts;
pub mod commands;
