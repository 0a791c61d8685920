//! Terminal front-end for gdforge
//!
//! A ratatui screen with three regions: the file sidebar, the script
//! editor, and a tabbed tool panel for generation, chat, images, error
//! analysis, and settings. All state lives in one [`App`] value driven by
//! a single event stream; generation requests run on spawned tasks and
//! come back as events, so the update loop never blocks and never shares
//! mutable state.

pub mod app;
pub mod event;
pub mod run;
pub mod view;

// Re-export public API
pub use app::{App, Focus, SettingsField, ToolTab};
pub use event::{AppEvent, EventLoop};
pub use run::run;
