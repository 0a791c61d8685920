//! Generation clients for gdforge
//!
//! Defines the [`GenerationClient`] trait the editor session talks to, the
//! request and response models that cross that boundary, and the Gemini
//! implementation that does the actual HTTP work. The session never sees a
//! URL or an API key; everything vendor-specific stays behind the trait.

pub mod client;
pub mod error;
pub mod gemini;
pub mod models;
pub mod prompt;

// Re-export public API
pub use client::GenerationClient;
pub use error::GenerationError;
pub use gemini::{GeminiClient, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
pub use models::{
    ArchitectureStyle, ChatContext, ChatMessage, ChatRole, CodeRequest, ErrorReport,
    GeneratedCode, GenerationSettings, ImageRequest, TypingStyle, Verbosity,
};
