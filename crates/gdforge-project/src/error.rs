//! Error types for project snapshot transformations

use thiserror::Error;

use crate::models::FileId;

/// Errors produced when a snapshot transformation is refused.
///
/// Every variant leaves the input snapshot untouched; transformations
/// either return a fresh snapshot or one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// A file name was empty or contained only whitespace.
    #[error("File name cannot be empty")]
    EmptyName,

    /// Deleting the file would leave the project with no files at all.
    #[error("Cannot delete the last remaining file")]
    LastFile,

    /// No file with the given id exists in the snapshot.
    #[error("No file with id {0}")]
    FileNotFound(FileId),
}
