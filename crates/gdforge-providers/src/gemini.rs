//! Google Gemini generation client
//!
//! Talks to the Gemini `generateContent` API for all four editor tools.
//! Text tools share one request path; image generation asks for an image
//! modality and writes the returned bytes to a local cache directory so
//! the UI gets a plain `file://` URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::client::GenerationClient;
use crate::error::GenerationError;
use crate::models::{ChatContext, ChatRole, CodeRequest, ErrorReport, GeneratedCode, ImageRequest};
use crate::prompt;

/// Model used for code, chat, and error analysis unless overridden.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Model used for image generation unless overridden.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Output budget for code generation responses.
const MAX_OUTPUT_TOKENS: usize = 8192;

/// Gemini implementation of [`GenerationClient`].
pub struct GeminiClient {
    api_key: String,
    client: Arc<Client>,
    base_url: String,
    text_model: String,
    image_model: String,
    image_dir: PathBuf,
}

impl GeminiClient {
    /// Create a new Gemini client instance
    pub fn new(api_key: String) -> Result<Self, GenerationError> {
        Self::with_client(Arc::new(Client::new()), api_key)
    }

    /// Create a new Gemini client with a custom base URL
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GenerationError> {
        Self::with_client_and_base_url(Arc::new(Client::new()), api_key, base_url)
    }

    /// Create a new Gemini client with a custom HTTP client
    pub fn with_client(client: Arc<Client>, api_key: String) -> Result<Self, GenerationError> {
        Self::with_client_and_base_url(
            client,
            api_key,
            "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        )
    }

    /// Create a new Gemini client with a custom HTTP client and base URL
    pub fn with_client_and_base_url(
        client: Arc<Client>,
        api_key: String,
        base_url: String,
    ) -> Result<Self, GenerationError> {
        if api_key.is_empty() {
            return Err(GenerationError::ConfigError(
                "Gemini API key is required".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            client,
            base_url,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_dir: default_image_dir(),
        })
    }

    /// Overrides the model used for code, chat, and analysis.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Overrides the model used for image generation.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Overrides where generated images are written.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    /// Posts one `generateContent` request and maps transport failures.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = self.endpoint(model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                GenerationError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, error_text);

            return match status.as_u16() {
                401 | 403 => Err(GenerationError::AuthError),
                429 => Err(GenerationError::RateLimited(60)),
                _ => Err(GenerationError::VendorError(format!(
                    "Gemini API error: {}",
                    status
                ))),
            };
        }

        Ok(response.json().await?)
    }

    /// Pulls the first text part out of a response.
    fn first_text(response: &GenerateContentResponse) -> Result<String, GenerationError> {
        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
            .iter()
            .find_map(|p| p.text.as_deref());

        match text {
            Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
            _ => Err(GenerationError::EmptyResponse),
        }
    }

    /// Pulls the first inline image out of a response.
    fn first_inline_image(response: &GenerateContentResponse) -> Option<&InlineData> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_code(&self, request: CodeRequest) -> Result<GeneratedCode, GenerationError> {
        debug!(
            "Sending code generation request to Gemini for model: {}",
            self.text_model
        );

        let wire = GenerateContentRequest {
            contents: vec![Content::user(prompt::code_prompt(&request))],
            generation_config: Some(GenerationConfig {
                temperature: Some(request.settings.clamped_creativity()),
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                response_modalities: None,
            }),
        };

        let response = self.generate_content(&self.text_model, &wire).await?;
        let text = Self::first_text(&response)?;
        parse_generated_code(&text)
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<String, GenerationError> {
        debug!(
            "Sending image generation request to Gemini for model: {}",
            self.image_model
        );

        let mut parts = vec![Part::text(prompt::image_prompt(&request))];
        if let Some(bytes) = &request.reference_image {
            parts.push(Part::inline(
                sniff_mime(bytes).to_string(),
                BASE64.encode(bytes),
            ));
        }

        let wire = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                max_output_tokens: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        let response = self.generate_content(&self.image_model, &wire).await?;
        let inline = Self::first_inline_image(&response).ok_or(GenerationError::EmptyResponse)?;

        let bytes = BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| GenerationError::ParseError(format!("Invalid image payload: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(&inline.mime_type));
        let path = self.image_dir.join(file_name);
        tokio::fs::create_dir_all(&self.image_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        debug!("Wrote generated image to {}", path.display());

        Ok(file_url(&path))
    }

    async fn chat(&self, request: ChatContext) -> Result<String, GenerationError> {
        debug!("Sending chat request to Gemini for model: {}", self.text_model);

        let mut contents: Vec<Content> = request
            .transcript
            .iter()
            .map(|m| Content {
                role: role_name(m.role).to_string(),
                parts: vec![Part::text(m.content.clone())],
            })
            .collect();
        contents.push(Content::user(prompt::chat_turn(&request)));

        let wire = GenerateContentRequest {
            contents,
            generation_config: None,
        };

        let response = self.generate_content(&self.text_model, &wire).await?;
        Self::first_text(&response)
    }

    async fn analyze_error(&self, request: ErrorReport) -> Result<String, GenerationError> {
        debug!(
            "Sending error analysis request to Gemini for model: {}",
            self.text_model
        );

        let wire = GenerateContentRequest {
            contents: vec![Content::user(prompt::error_prompt(&request))],
            generation_config: None,
        };

        let response = self.generate_content(&self.text_model, &wire).await?;
        Self::first_text(&response)
    }
}

/// Gemini role string for a transcript entry.
fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

/// Default location for decoded images: the user cache, or tmp as a last resort.
fn default_image_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gdforge")
        .join("images")
}

/// Renders a local path as a `file://` URL for the UI.
fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Parses the model's JSON reply into replacement code plus explanation.
///
/// Tolerates a fenced reply even though the prompt forbids fences; models
/// add them anyway often enough that refusing would burn user requests.
fn parse_generated_code(raw: &str) -> Result<GeneratedCode, GenerationError> {
    let cleaned = strip_code_fence(raw);
    let parsed: GeneratedCode = serde_json::from_str(cleaned)
        .map_err(|e| GenerationError::ParseError(format!("Expected code/explanation JSON: {}", e)))?;

    if parsed.code.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(parsed)
}

/// Removes a surrounding markdown fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json", "gdscript", ...) on the opening line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return trimmed,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Guesses a mime type from magic bytes, defaulting to PNG.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

/// File extension for a returned mime type.
fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Gemini API content format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Content {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

/// Gemini API part format: text or inline binary data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: String, data: String) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

/// Gemini API inline data format (base64 payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Gemini API generation config
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Gemini API candidate format
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
