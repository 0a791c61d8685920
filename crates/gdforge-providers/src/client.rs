//! The boundary trait between the editor and any generation back end

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::models::{ChatContext, CodeRequest, ErrorReport, GeneratedCode, ImageRequest};

/// One async call per editor tool.
///
/// Implementations own all vendor details: endpoints, credentials, retry
/// posture. Callers only ever see domain requests going in and parsed
/// results or a [`GenerationError`] coming out. Every method is
/// read-only with respect to editor state; applying a result is the
/// caller's decision.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates replacement content for one file from a prompt.
    async fn generate_code(&self, request: CodeRequest) -> Result<GeneratedCode, GenerationError>;

    /// Generates a game asset image, returning a URL the UI can show.
    async fn generate_image(&self, request: ImageRequest) -> Result<String, GenerationError>;

    /// Answers a development question with project context.
    async fn chat(&self, request: ChatContext) -> Result<String, GenerationError>;

    /// Explains a pasted runtime error against the offending script.
    async fn analyze_error(&self, request: ErrorReport) -> Result<String, GenerationError>;
}
