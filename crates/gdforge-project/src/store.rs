//! Pure snapshot transformations
//!
//! Every function here takes a snapshot by reference and returns a new one,
//! leaving the input untouched. Callers (the editor session) decide whether
//! the result becomes visible state and whether it enters the undo history.

use tracing::debug;

use crate::error::ProjectError;
use crate::models::{FileId, FileKind, ProjectSnapshot, ScriptFile};

/// Adds a new file with kind-appropriate starter content.
///
/// The name is trimmed before use; an empty or whitespace-only name is
/// refused. Duplicate names are allowed since identity lives in the id.
pub fn create_file(snapshot: &ProjectSnapshot, name: &str) -> Result<ProjectSnapshot, ProjectError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProjectError::EmptyName);
    }

    let kind = FileKind::from_name(trimmed);
    let file = ScriptFile::new(trimmed, kind.default_content());
    debug!(file_id = %file.id, name = trimmed, "creating file");

    let mut files = snapshot.files().to_vec();
    files.push(file);
    Ok(ProjectSnapshot::new(files))
}

/// Replaces the content of one file, leaving every other file untouched.
///
/// An unknown id yields a snapshot equal to the input; content for a file
/// that no longer exists has nowhere to go and is simply dropped.
pub fn update_file_content(
    snapshot: &ProjectSnapshot,
    id: FileId,
    content: impl Into<String>,
) -> ProjectSnapshot {
    let content = content.into();
    if !snapshot.contains(id) {
        debug!(file_id = %id, "update targets a missing file; snapshot unchanged");
        return snapshot.clone();
    }

    let files = snapshot
        .files()
        .iter()
        .map(|file| {
            if file.id == id {
                ScriptFile {
                    id: file.id,
                    name: file.name.clone(),
                    content: content.clone(),
                }
            } else {
                file.clone()
            }
        })
        .collect();
    ProjectSnapshot::new(files)
}

/// Removes a file from the snapshot.
///
/// Refuses to remove the last remaining file so the project never becomes
/// empty, and refuses ids that are not present.
pub fn delete_file(snapshot: &ProjectSnapshot, id: FileId) -> Result<ProjectSnapshot, ProjectError> {
    if snapshot.len() <= 1 {
        return Err(ProjectError::LastFile);
    }
    if !snapshot.contains(id) {
        return Err(ProjectError::FileNotFound(id));
    }
    debug!(file_id = %id, "deleting file");

    let files = snapshot
        .files()
        .iter()
        .filter(|file| file.id != id)
        .cloned()
        .collect();
    Ok(ProjectSnapshot::new(files))
}

/// Resolves an id against a snapshot, for reads of the currently open file.
pub fn resolve_file(snapshot: &ProjectSnapshot, id: FileId) -> Option<&ScriptFile> {
    snapshot.get(id)
}
