//! Core repository components
//!
//! - `database`: content-addressed loose-object store
//! - `refs`: branch references and HEAD resolution
//! - `repository`: handle tying the object store and refs together

pub mod database;
pub mod refs;
pub mod repository;
