//! The snapshot log and its cursor

use gdforge_project::ProjectSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An append-mostly log of project snapshots with a cursor into it.
///
/// The snapshot under the cursor is always the state the editor shows.
/// Undo steps the cursor back, redo steps it forward, and pushing a new
/// snapshot truncates everything past the cursor before appending, so a
/// divergent redo branch is discarded rather than kept.
///
/// Consecutive equal snapshots are stored as-is; the log never collapses
/// duplicates, so every recorded edit costs exactly one undo step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    snapshots: Vec<ProjectSnapshot>,
    index: usize,
}

impl HistoryLog {
    /// Starts a log from the seed snapshot, with the cursor on it.
    ///
    /// The seed is the floor of the history: it can never be undone away,
    /// so the log is never empty and `current` always has something to
    /// return.
    pub fn new(seed: ProjectSnapshot) -> Self {
        HistoryLog {
            snapshots: vec![seed],
            index: 0,
        }
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &ProjectSnapshot {
        &self.snapshots[self.index]
    }

    /// Records a new state: drops any redo branch, appends, advances.
    pub fn push(&mut self, snapshot: ProjectSnapshot) {
        let discarded = self.snapshots.len() - (self.index + 1);
        if discarded > 0 {
            debug!(discarded, "discarding redo branch");
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index = self.snapshots.len() - 1;
    }

    /// Steps the cursor back one snapshot.
    ///
    /// Returns the newly current snapshot, or `None` when already at the
    /// seed; the failed case changes nothing.
    pub fn undo(&mut self) -> Option<&ProjectSnapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Steps the cursor forward one snapshot.
    ///
    /// Returns the newly current snapshot, or `None` when no redo state
    /// exists; the failed case changes nothing.
    pub fn redo(&mut self) -> Option<&ProjectSnapshot> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    /// Whether the cursor has anywhere to step back to.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether a redo branch exists past the cursor.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Total number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the seed snapshot is never removed.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor position, which doubles as the number of undoable steps.
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdforge_project::{create_file, update_file_content, ProjectSnapshot};

    fn seed() -> ProjectSnapshot {
        ProjectSnapshot::starter()
    }

    /// Seed with the starter file's content rewritten, to get distinct states.
    fn edited(base: &ProjectSnapshot, content: &str) -> ProjectSnapshot {
        let id = base.files()[0].id;
        update_file_content(base, id, content)
    }

    #[test]
    fn starts_with_cursor_on_seed() {
        let log = HistoryLog::new(seed());
        assert_eq!(log.len(), 1);
        assert_eq!(log.index(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn push_appends_and_advances() {
        let base = seed();
        let mut log = HistoryLog::new(base.clone());
        let next = edited(&base, "a");

        log.push(next.clone());

        assert_eq!(log.len(), 2);
        assert_eq!(log.index(), 1);
        assert_eq!(log.current(), &next);
        assert!(log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn undo_then_redo_restores_exactly() {
        let base = seed();
        let mut log = HistoryLog::new(base.clone());
        let next = edited(&base, "a");
        log.push(next.clone());

        assert_eq!(log.undo(), Some(&base));
        assert_eq!(log.current(), &base);
        assert_eq!(log.redo(), Some(&next));
        assert_eq!(log.current(), &next);
    }

    #[test]
    fn undo_at_seed_is_a_no_op() {
        let mut log = HistoryLog::new(seed());
        let before = log.current().clone();

        assert!(log.undo().is_none());
        assert_eq!(log.current(), &before);
        assert_eq!(log.index(), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn redo_without_branch_is_a_no_op() {
        let base = seed();
        let mut log = HistoryLog::new(base.clone());
        log.push(edited(&base, "a"));

        assert!(log.redo().is_none());
        assert_eq!(log.index(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn push_after_undo_discards_the_redo_branch() {
        let base = seed();
        let mut log = HistoryLog::new(base.clone());
        let a = edited(&base, "a");
        let b = edited(&base, "b");
        let c = edited(&base, "c");
        log.push(a);
        log.push(b.clone());
        log.undo();
        log.undo();
        assert_eq!(log.index(), 0);

        log.push(c.clone());

        assert_eq!(log.len(), 2);
        assert_eq!(log.index(), 1);
        assert_eq!(log.current(), &c);
        // the old branch is gone: redo has nothing to reach
        assert!(!log.can_redo());
        assert!(log.redo().is_none());
        assert_ne!(log.current(), &b);
    }

    #[test]
    fn equal_snapshots_each_cost_one_undo_step() {
        let base = seed();
        let mut log = HistoryLog::new(base.clone());
        let same = edited(&base, "a");
        log.push(same.clone());
        log.push(same.clone());

        assert_eq!(log.len(), 3);
        assert_eq!(log.undo(), Some(&same));
        assert_eq!(log.undo(), Some(&base));
    }

    #[test]
    fn create_then_undo_then_edit_matches_cursor_arithmetic() {
        // mirrors a user who adds a file, undoes it, then edits instead
        let base = seed();
        let mut log = HistoryLog::new(base.clone());

        let with_enemy = create_file(&base, "enemy.gd").unwrap();
        log.push(with_enemy);
        assert_eq!((log.len(), log.index()), (2, 1));

        log.undo();
        assert_eq!(log.current().len(), 1);

        let edited_main = edited(&base, "extends Node2D\n");
        log.push(edited_main.clone());

        assert_eq!((log.len(), log.index()), (2, 1));
        assert_eq!(log.current(), &edited_main);
        assert_eq!(log.current().len(), 1);
    }
}
