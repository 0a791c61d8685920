//! Data models for the project file set

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default content for a newly created script file.
const SCRIPT_TEMPLATE: &str = "extends Node\n\n\nfunc _ready() -> void:\n\tpass\n";

/// Default content for a newly created structured-data file.
const DATA_TEMPLATE: &str = "{}\n";

/// Name of the single file every fresh project starts with.
const STARTER_FILE_NAME: &str = "main.gd";

/// Stable, opaque identifier for a file.
///
/// Ids are assigned once at creation and never change, no matter how often
/// the file's content is rewritten. Display names are separate and carry no
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        FileId(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad category of a file, derived from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// A GDScript source file.
    Script,
    /// A structured-data file such as a JSON resource.
    Data,
}

impl FileKind {
    /// Derives the kind from a file name.
    ///
    /// Names ending in `.json` are structured data; everything else is
    /// treated as a script.
    pub fn from_name(name: &str) -> Self {
        if name.trim().to_ascii_lowercase().ends_with(".json") {
            FileKind::Data
        } else {
            FileKind::Script
        }
    }

    /// Starter content for a new file of this kind.
    pub fn default_content(self) -> &'static str {
        match self {
            FileKind::Script => SCRIPT_TEMPLATE,
            FileKind::Data => DATA_TEMPLATE,
        }
    }

    /// Short human-readable label, used in file listings.
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Script => "gdscript",
            FileKind::Data => "json",
        }
    }
}

/// A single file in the project: identity, display name, and full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFile {
    /// Stable identifier, assigned at creation.
    pub id: FileId,
    /// Display name, including its suffix (for example `player.gd`).
    pub name: String,
    /// Complete text content of the file.
    pub content: String,
}

impl ScriptFile {
    /// Creates a file with a fresh id.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        ScriptFile {
            id: FileId::new(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// The kind derived from this file's name.
    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// An immutable value describing the complete file set at one instant.
///
/// Snapshots are cheap to clone and compare; the history log stores them
/// wholesale. A snapshot always contains at least one file and never two
/// files with the same id. Both invariants are maintained by the
/// transformation functions in [`crate::store`], which are the only
/// sanctioned way to derive one snapshot from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    files: Vec<ScriptFile>,
}

impl ProjectSnapshot {
    /// Builds a snapshot from an explicit file list.
    ///
    /// Callers are responsible for id uniqueness; files created through
    /// [`ScriptFile::new`] always satisfy it.
    pub fn new(files: Vec<ScriptFile>) -> Self {
        ProjectSnapshot { files }
    }

    /// The seed snapshot for a fresh project: one starter script.
    pub fn starter() -> Self {
        ProjectSnapshot::new(vec![ScriptFile::new(STARTER_FILE_NAME, SCRIPT_TEMPLATE)])
    }

    /// All files, in creation order.
    pub fn files(&self) -> &[ScriptFile] {
        &self.files
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot holds no files.
    ///
    /// Never true for snapshots produced by this crate; present so the
    /// type reads like any other collection.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Looks up a file by id.
    pub fn get(&self, id: FileId) -> Option<&ScriptFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Whether a file with the given id exists.
    pub fn contains(&self, id: FileId) -> bool {
        self.get(id).is_some()
    }

    /// Position of a file in creation order, if present.
    pub fn position(&self, id: FileId) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_derived_from_suffix() {
        assert_eq!(FileKind::from_name("player.gd"), FileKind::Script);
        assert_eq!(FileKind::from_name("config.json"), FileKind::Data);
        assert_eq!(FileKind::from_name("Config.JSON"), FileKind::Data);
        assert_eq!(FileKind::from_name("notes"), FileKind::Script);
    }

    #[test]
    fn starter_snapshot_has_one_script() {
        let snapshot = ProjectSnapshot::starter();
        assert_eq!(snapshot.len(), 1);
        let file = &snapshot.files()[0];
        assert_eq!(file.name, "main.gd");
        assert_eq!(file.kind(), FileKind::Script);
        assert!(file.content.contains("func _ready()"));
    }

    #[test]
    fn file_ids_are_unique_across_creations() {
        let a = ScriptFile::new("a.gd", "");
        let b = ScriptFile::new("a.gd", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn file_id_round_trips_through_serde() {
        let id = FileId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
