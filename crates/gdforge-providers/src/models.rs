//! Request and response models shared by all generation clients

use std::fmt;

use chrono::{DateTime, Utc};
use gdforge_project::{FileId, ProjectSnapshot};
use serde::{Deserialize, Serialize};

/// How chatty generated code should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// Bare code, comments only where unavoidable
    Minimal,
    /// Brief comments on non-obvious sections
    Standard,
    /// Teaching-style comments on every step
    Educational,
}

impl Verbosity {
    /// All values, in cycling order for the settings panel.
    pub const ALL: [Verbosity; 3] = [Verbosity::Minimal, Verbosity::Standard, Verbosity::Educational];
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verbosity::Minimal => "Minimal",
            Verbosity::Standard => "Standard",
            Verbosity::Educational => "Educational",
        };
        write!(f, "{}", label)
    }
}

/// Whether generated GDScript uses static typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypingStyle {
    /// Explicit parameter, return, and variable types
    Strict,
    /// No type annotations
    Dynamic,
}

impl TypingStyle {
    /// All values, in cycling order for the settings panel.
    pub const ALL: [TypingStyle; 2] = [TypingStyle::Strict, TypingStyle::Dynamic];
}

impl fmt::Display for TypingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TypingStyle::Strict => "Strict",
            TypingStyle::Dynamic => "Dynamic",
        };
        write!(f, "{}", label)
    }
}

/// Structural preference for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchitectureStyle {
    /// Let the model pick whatever fits
    Default,
    /// Prefer small composable nodes and resources
    Composition,
    /// Prefer extending base classes
    Inheritance,
}

impl ArchitectureStyle {
    /// All values, in cycling order for the settings panel.
    pub const ALL: [ArchitectureStyle; 3] = [
        ArchitectureStyle::Default,
        ArchitectureStyle::Composition,
        ArchitectureStyle::Inheritance,
    ];
}

impl fmt::Display for ArchitectureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArchitectureStyle::Default => "Default",
            ArchitectureStyle::Composition => "Composition",
            ArchitectureStyle::Inheritance => "Inheritance",
        };
        write!(f, "{}", label)
    }
}

/// User-tunable knobs applied to every code generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature control in `[0.0, 1.0]`
    pub creativity: f32,
    /// Comment density of generated code
    pub verbosity: Verbosity,
    /// Static vs dynamic typing in generated code
    pub typing: TypingStyle,
    /// Structural preference for generated code
    pub architecture: ArchitectureStyle,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            creativity: 0.5,
            verbosity: Verbosity::Standard,
            typing: TypingStyle::Strict,
            architecture: ArchitectureStyle::Default,
        }
    }
}

impl GenerationSettings {
    /// Creativity clamped to the valid sampling range.
    pub fn clamped_creativity(&self) -> f32 {
        self.creativity.clamp(0.0, 1.0)
    }
}

/// A request to generate or rewrite code for one file.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    /// What the user asked for
    pub prompt: String,
    /// The full project, sent along as context
    pub snapshot: ProjectSnapshot,
    /// The file whose content the result will replace
    pub target: FileId,
    /// Generation knobs in effect when the request was made
    pub settings: GenerationSettings,
}

/// The parsed result of a code generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Replacement content for the target file
    pub code: String,
    /// Prose summary of what the model did
    pub explanation: String,
}

/// A request to generate a game asset image.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Description of the desired asset
    pub prompt: String,
    /// Optional reference image the result should resemble
    pub reference_image: Option<Vec<u8>>,
}

/// Who said a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    /// The person at the keyboard
    User,
    /// The model
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        write!(f, "{}", label)
    }
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A user message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant message timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A chat turn: prior transcript, the new question, and project context.
#[derive(Debug, Clone)]
pub struct ChatContext {
    /// Messages exchanged so far, oldest first, excluding `message`
    pub transcript: Vec<ChatMessage>,
    /// The new user message
    pub message: String,
    /// The full project, sent along as context
    pub snapshot: ProjectSnapshot,
}

/// A runtime error pasted in for analysis, with the script it came from.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// The error text as the engine printed it
    pub error_text: String,
    /// Name of the script under suspicion
    pub file_name: String,
    /// Full content of that script
    pub file_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_values() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.creativity, 0.5);
        assert_eq!(settings.verbosity, Verbosity::Standard);
        assert_eq!(settings.typing, TypingStyle::Strict);
        assert_eq!(settings.architecture, ArchitectureStyle::Default);
    }

    #[test]
    fn creativity_is_clamped_to_sampling_range() {
        let mut settings = GenerationSettings::default();
        settings.creativity = 7.5;
        assert_eq!(settings.clamped_creativity(), 1.0);
        settings.creativity = -0.2;
        assert_eq!(settings.clamped_creativity(), 0.0);
        settings.creativity = 0.3;
        assert_eq!(settings.clamped_creativity(), 0.3);
    }

    #[test]
    fn chat_constructors_set_roles() {
        assert_eq!(ChatMessage::user("hi").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("hello").role, ChatRole::Assistant);
    }
}
