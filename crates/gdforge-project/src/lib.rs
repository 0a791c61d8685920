#![warn(missing_docs)]

//! Project file set for gdforge
//!
//! Holds the in-memory project model: a flat set of named script files plus
//! the pure transformation functions that produce new snapshots from old
//! ones. Nothing in this crate touches the terminal, the network, or the
//! undo history; callers decide what to do with the snapshots it returns.

pub mod error;
pub mod models;
pub mod store;

// Re-export public API
pub use error::ProjectError;
pub use models::{FileId, FileKind, ProjectSnapshot, ScriptFile};
pub use store::{create_file, delete_file, resolve_file, update_file_content};
