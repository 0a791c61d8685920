#![warn(missing_docs)]

//! Linear undo/redo history for gdforge
//!
//! Records every project state as a full snapshot in an ordered log with a
//! cursor. Undo and redo only move the cursor; pushing a new state while
//! the cursor sits mid-log discards the abandoned redo branch. There is no
//! tree of histories and no persistence: one session, one log.

pub mod log;

// Re-export public API
pub use log::HistoryLog;
