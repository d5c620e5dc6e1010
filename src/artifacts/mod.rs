//! Git data structures and algorithms
//!
//! - `bomb`: generation parameters and expansion measurement
//! - `branch`: branch name validation and symbolic refs
//! - `objects`: object types (blob, tree, commit)

pub mod bomb;
pub mod branch;
pub mod objects;
