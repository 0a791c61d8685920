//! Error types for editor session operations

use thiserror::Error;

use gdforge_project::{FileId, ProjectError};
use gdforge_providers::GenerationError;

use crate::request::ToolKind;

/// Errors surfaced to the UI as status-line text.
///
/// None of these leave the session in a changed state: a refused
/// operation pushes nothing onto the history and mutates nothing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// A snapshot transformation was refused
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// A generation request finished with an error
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The same tool already has a request in flight
    #[error("A {0} request is already running")]
    RequestInFlight(ToolKind),

    /// A response arrived whose ticket no longer matches the pending request
    #[error("Stale response dropped")]
    StaleResponse,

    /// An operation referenced a file that is not in the snapshot
    #[error("No file with id {0}")]
    UnknownFile(FileId),

    /// Generated code arrived after its target file was deleted
    #[error("The target file no longer exists")]
    TargetMissing,

    /// The user submitted an empty prompt
    #[error("Prompt is empty")]
    EmptyPrompt,
}
