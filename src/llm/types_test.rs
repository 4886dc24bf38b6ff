use super::*;
use crate::error::ErrorCode;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_codes_are_stable() {
    assert_eq!(LlmError::ConfigParse("bad".into()).error_code(), "E_CONFIG_PARSE");
    assert_eq!(LlmError::MissingApiKey { var: "KEY".into() }.error_code(), "E_MISSING_API_KEY");
    assert_eq!(LlmError::ApiRequest("timeout".into()).error_code(), "E_API_REQUEST");
    assert_eq!(LlmError::ApiResponse { status: 500, body: "oops".into() }.error_code(), "E_API_RESPONSE");
    assert_eq!(LlmError::ApiParse("json".into()).error_code(), "E_API_PARSE");
    assert_eq!(LlmError::HttpClientBuild("tls".into()).error_code(), "E_HTTP_CLIENT_BUILD");
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_transport_and_server_errors() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn not_retryable_client_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::ApiResponse { status: 403, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("json".into()).retryable());
    assert!(!LlmError::MissingApiKey { var: "K".into() }.retryable());
}

#[test]
fn display_missing_api_key_names_var() {
    let err = LlmError::MissingApiKey { var: "GEMINI_API_KEY".into() };
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

// =============================================================================
// Wire shape
// =============================================================================

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
    assert_eq!(serde_json::to_value(Role::Model).unwrap(), "model");
    assert_eq!(Role::Model.as_str(), "model");
}

#[test]
fn jpeg_part_uses_inline_data_camel_case() {
    let json = serde_json::to_value(Part::jpeg("AAAA")).unwrap();
    assert_eq!(json, serde_json::json!({ "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } }));
}

#[test]
fn text_part_is_bare_text_object() {
    let json = serde_json::to_value(Part::text("oi")).unwrap();
    assert_eq!(json, serde_json::json!({ "text": "oi" }));
}

#[test]
fn turn_decodes_mixed_parts() {
    let turn: Turn = serde_json::from_value(serde_json::json!({
        "role": "user",
        "parts": [
            { "inlineData": { "mimeType": "image/jpeg", "data": "Zm9v" } },
            { "text": "minha sala" }
        ]
    }))
    .unwrap();
    assert_eq!(turn.role, Role::User);
    assert_eq!(turn.parts, vec![Part::jpeg("Zm9v"), Part::text("minha sala")]);
}

#[test]
fn grounding_chunk_without_web_decodes_to_none() {
    let chunk: GroundingChunk =
        serde_json::from_value(serde_json::json!({ "retrievedContext": { "uri": "x" } })).unwrap();
    assert!(chunk.web.is_none());
}
