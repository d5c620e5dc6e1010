//! Git object types and operations
//!
//! Every object is identified by the SHA-1 digest of its framed bytes:
//! `<type> <size>\0<content>`. Three object types are understood:
//!
//! - **Blob**: raw file content
//! - **Tree**: directory listing (modes, names and child object IDs)
//! - **Commit**: a tree snapshot plus parents, identity and message

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
