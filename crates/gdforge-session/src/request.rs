//! Correlation tickets for in-flight generation requests
//!
//! Every request the session hands out carries a fresh id. When the shell
//! delivers the eventual response it must present the same ticket; a
//! response whose ticket no longer matches what the session is waiting
//! for is dropped instead of applied. That makes late responses for
//! superseded requests harmless no matter how the shell schedules its
//! futures.

use std::fmt;

use gdforge_providers::{GeneratedCode, GenerationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four generation tools, one request slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Rewrite the open file from a prompt
    Code,
    /// Conversational Q&A with project context
    Chat,
    /// Game asset image generation
    Image,
    /// Runtime error analysis
    Analysis,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToolKind::Code => "code generation",
            ToolKind::Chat => "chat",
            ToolKind::Image => "image generation",
            ToolKind::Analysis => "error analysis",
        };
        write!(f, "{}", label)
    }
}

/// Unique id for one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The correlation token a caller keeps while a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    /// Id of the request this ticket belongs to
    pub id: RequestId,
    /// Which tool slot the request occupies
    pub kind: ToolKind,
}

impl RequestTicket {
    pub(crate) fn new(kind: ToolKind) -> Self {
        RequestTicket {
            id: RequestId::new(),
            kind,
        }
    }
}

/// The finished result of a generation request, success or failure.
#[derive(Debug, Clone)]
pub enum ToolResponse {
    /// Result of a code generation request
    Code(Result<GeneratedCode, GenerationError>),
    /// Result of a chat request
    Chat(Result<String, GenerationError>),
    /// Result of an image request: a URL the UI can display
    Image(Result<String, GenerationError>),
    /// Result of an error analysis request
    Analysis(Result<String, GenerationError>),
}

impl ToolResponse {
    /// The tool slot this response belongs to.
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolResponse::Code(_) => ToolKind::Code,
            ToolResponse::Chat(_) => ToolKind::Chat,
            ToolResponse::Image(_) => ToolKind::Image,
            ToolResponse::Analysis(_) => ToolKind::Analysis,
        }
    }
}

/// What a successfully completed request did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Generated code replaced the content of the named file
    Code {
        /// Display name of the rewritten file
        file_name: String,
    },
    /// An assistant reply was appended to the transcript
    Chat,
    /// A new image is available at the given URL
    Image {
        /// Where the image was written
        url: String,
    },
    /// A fresh error analysis replaced the previous one
    Analysis,
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Code { file_name } => write!(f, "Updated {}", file_name),
            Applied::Chat => write!(f, "Chat reply received"),
            Applied::Image { .. } => write!(f, "Image generated"),
            Applied::Analysis => write!(f, "Error analysis ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_get_distinct_ids() {
        let a = RequestTicket::new(ToolKind::Code);
        let b = RequestTicket::new(ToolKind::Code);
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind, b.kind);
    }

    #[test]
    fn responses_know_their_tool() {
        let response = ToolResponse::Chat(Ok("hi".to_string()));
        assert_eq!(response.kind(), ToolKind::Chat);
    }

    #[test]
    fn applied_renders_status_text() {
        let applied = Applied::Code {
            file_name: "player.gd".to_string(),
        };
        assert_eq!(applied.to_string(), "Updated player.gd");
    }
}
