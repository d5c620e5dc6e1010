//! Operations on a repository, implemented as methods on `Repository`.
//!
//! - `plant`: seed from the branch tip and stack fan-out levels on top of it

pub mod plant;
