//! Integration tests for the Gemini client against a mock HTTP server

use gdforge_project::ProjectSnapshot;
use gdforge_providers::{
    ChatContext, ChatMessage, CodeRequest, ErrorReport, GeminiClient, GenerationClient,
    GenerationError, GenerationSettings, ImageRequest,
};
use mockito::Matcher;

fn code_request() -> CodeRequest {
    let snapshot = ProjectSnapshot::starter();
    let target = snapshot.files()[0].id;
    CodeRequest {
        prompt: "add a jump".to_string(),
        snapshot,
        target,
        settings: GenerationSettings::default(),
    }
}

/// Response body whose single text part is a JSON code/explanation object.
fn code_reply_body(code: &str, explanation: &str) -> String {
    let inner = serde_json::json!({ "code": code, "explanation": explanation }).to_string();
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": inner }] }
        }]
    })
    .to_string()
}

/// Response body with a plain text part.
fn text_reply_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
    .to_string()
}

#[test]
fn test_gemini_client_creation_success() {
    let client = GeminiClient::new("test-key".to_string());
    assert!(client.is_ok());
}

#[test]
fn test_gemini_client_creation_empty_key() {
    let client = GeminiClient::new("".to_string());
    assert!(client.is_err());
    match client {
        Err(e) => assert!(e.to_string().contains("API key is required")),
        Ok(_) => panic!("Expected error for empty API key"),
    }
}

/// Test: Code generation round trip
/// For any successful response, the client SHALL return the parsed code and
/// explanation, sending the key as a query parameter and camelCase config.
#[tokio::test]
async fn test_generate_code_success() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "generationConfig": { "temperature": 0.5, "maxOutputTokens": 8192 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(code_reply_body("extends Node2D\n", "rewrote the scene root"))
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let result = client.generate_code(code_request()).await.unwrap();

    assert_eq!(result.code, "extends Node2D\n");
    assert_eq!(result.explanation, "rewrote the scene root");
}

/// Test: Model override lands in the request path
#[tokio::test]
async fn test_generate_code_honors_text_model_override() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/my-tuned-model:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(code_reply_body("pass\n", "ok"))
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url())
        .unwrap()
        .with_text_model("my-tuned-model");
    let result = client.generate_code(code_request()).await;

    assert!(result.is_ok());
}

/// Test: Authentication failures map to AuthError for both 401 and 403
#[tokio::test]
async fn test_generate_code_auth_errors() {
    for status in [401, 403] {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .with_status(status)
            .with_body(r#"{"error": {"message": "bad key"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
        let result = client.generate_code(code_request()).await;

        assert_eq!(result.unwrap_err(), GenerationError::AuthError);
    }
}

/// Test: Rate limiting maps to RateLimited with the default retry hint
#[tokio::test]
async fn test_generate_code_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(429)
        .with_body(r#"{"error": {"message": "quota"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let result = client.generate_code(code_request()).await;

    assert_eq!(result.unwrap_err(), GenerationError::RateLimited(60));
}

/// Test: Other failure statuses map to VendorError
#[tokio::test]
async fn test_generate_code_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let result = client.generate_code(code_request()).await;

    assert!(matches!(
        result.unwrap_err(),
        GenerationError::VendorError(_)
    ));
}

/// Test: A reply that is not the promised JSON object is a parse error
#[tokio::test]
async fn test_generate_code_malformed_reply() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_reply_body("Sure! Here's some code: pass"))
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let result = client.generate_code(code_request()).await;

    assert!(matches!(result.unwrap_err(), GenerationError::ParseError(_)));
}

/// Test: A response with no candidates is an empty response
#[tokio::test]
async fn test_generate_code_no_candidates() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let result = client.generate_code(code_request()).await;

    assert_eq!(result.unwrap_err(), GenerationError::EmptyResponse);
}

/// Test: Connection failures surface as network errors
#[tokio::test]
async fn test_generate_code_connection_error() {
    let client =
        GeminiClient::with_base_url("test-key".to_string(), "http://127.0.0.1:1".to_string())
            .unwrap();
    let result = client.generate_code(code_request()).await;

    assert!(matches!(
        result.unwrap_err(),
        GenerationError::NetworkError(_)
    ));
}

/// Test: Chat sends prior turns with the model role and returns the reply
#[tokio::test]
async fn test_chat_includes_transcript_roles() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("\"role\":\"model\"".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_reply_body("Signals connect nodes."))
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let context = ChatContext {
        transcript: vec![
            ChatMessage::user("what are signals?"),
            ChatMessage::assistant("An event mechanism."),
        ],
        message: "show me an example".to_string(),
        snapshot: ProjectSnapshot::starter(),
    };
    let reply = client.chat(context).await.unwrap();

    assert_eq!(reply, "Signals connect nodes.");
}

/// Test: Error analysis returns the model's plain text answer
#[tokio::test]
async fn test_analyze_error_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-2.0-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_reply_body("The variable is unset before use."))
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key".to_string(), server.url()).unwrap();
    let report = ErrorReport {
        error_text: "Invalid get index 'speed'".to_string(),
        file_name: "player.gd".to_string(),
        file_content: "extends Node\n".to_string(),
    };
    let reply = client.analyze_error(report).await.unwrap();

    assert!(reply.contains("unset before use"));
}

/// Test: Image generation decodes inline data, writes it out, and returns
/// a file:// URL pointing at the written bytes
#[tokio::test]
async fn test_generate_image_writes_decoded_bytes() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let png_bytes: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let body = serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "text": "Here is your sprite." },
                    { "inlineData": { "mimeType": "image/png", "data": STANDARD.encode(png_bytes) } }
                ]
            }
        }]
    })
    .to_string();

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock(
            "POST",
            "/gemini-2.0-flash-preview-image-generation:generateContent",
        )
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("responseModalities".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = GeminiClient::with_base_url("test-key".to_string(), server.url())
        .unwrap()
        .with_image_dir(dir.path());
    let url = client
        .generate_image(ImageRequest {
            prompt: "a red potion".to_string(),
            reference_image: None,
        })
        .await
        .unwrap();

    assert!(url.starts_with("file://"));
    assert!(url.ends_with(".png"));
    let path = url.strip_prefix("file://").unwrap();
    let written = std::fs::read(path).unwrap();
    assert_eq!(written, png_bytes);
}

/// Test: A reference image travels as inline data in the request body
#[tokio::test]
async fn test_generate_image_sends_reference_inline() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock(
            "POST",
            "/gemini-2.0-flash-preview-image-generation:generateContent",
        )
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("\"inlineData\"".to_string()),
            Matcher::Regex("\"mimeType\":\"image/png\"".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_reply_body("no image today"))
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = GeminiClient::with_base_url("test-key".to_string(), server.url())
        .unwrap()
        .with_image_dir(dir.path());
    let result = client
        .generate_image(ImageRequest {
            prompt: "a red potion".to_string(),
            reference_image: Some(vec![0x89, b'P', b'N', b'G']),
        })
        .await;

    // body matched (so the reference was sent); reply had no image part
    assert_eq!(result.unwrap_err(), GenerationError::EmptyResponse);
}

/// Test: A text-only reply to an image request is an empty response
#[tokio::test]
async fn test_generate_image_without_inline_part() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock(
            "POST",
            "/gemini-2.0-flash-preview-image-generation:generateContent",
        )
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_reply_body("cannot draw that"))
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = GeminiClient::with_base_url("test-key".to_string(), server.url())
        .unwrap()
        .with_image_dir(dir.path());
    let result = client
        .generate_image(ImageRequest {
            prompt: "a red potion".to_string(),
            reference_image: None,
        })
        .await;

    assert_eq!(result.unwrap_err(), GenerationError::EmptyResponse);
}
