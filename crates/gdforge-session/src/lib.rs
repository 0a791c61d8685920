//! Editor session state for gdforge
//!
//! One [`EditorSession`] value owns everything a running editor knows: the
//! visible project snapshot, the undo history, the open file, the chat
//! transcript, generated images, tuning settings, and the set of
//! generation requests still in flight. The session is strictly
//! synchronous; the UI shell performs the actual network calls and feeds
//! results back in with the correlation ticket it was handed when the
//! request began.

pub mod error;
pub mod request;
pub mod session;

// Re-export public API
pub use error::SessionError;
pub use request::{Applied, RequestId, RequestTicket, ToolKind, ToolResponse};
pub use session::{EditorSession, GeneratedImage};
