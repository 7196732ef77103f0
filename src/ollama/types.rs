//! Request and response types for the Ollama `/api/generate` endpoint.
//!
//! All structs derive `Serialize`/`Deserialize` for JSON conversion in the
//! format the locally hosted model server expects.

use serde::{Deserialize, Serialize};

/// Request body for the `/api/generate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "qwen3:30b").
    pub model: String,
    /// The full prompt text.
    pub prompt: String,
    /// Always `false` here — the pipeline consumes complete responses.
    pub stream: bool,
    /// Decoding parameters.
    pub options: GenerateOptions,
}

/// Sampling/decoding options passed through to the model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    /// Maximum number of generated tokens.
    pub num_predict: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
    pub top_k: u32,
}

/// Response body of a non-streaming `/api/generate` call.
///
/// The server returns more bookkeeping fields (timings, context); only the
/// generated text matters to this pipeline and unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text.
    #[serde(default)]
    pub response: String,
    /// Whether generation ran to completion.
    #[serde(default)]
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_serializes_options() {
        let req = GenerateRequest {
            model: "qwen3:30b".into(),
            prompt: "こんにちは".into(),
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                num_predict: 500,
                top_p: 0.9,
                top_k: 40,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "qwen3:30b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 500);
        assert_eq!(json["options"]["top_k"], 40);
    }

    #[test]
    fn generate_response_ignores_unknown_fields() {
        let json = r#"{
            "model": "qwen3:30b",
            "created_at": "2024-12-01T00:00:00Z",
            "response": "件名: テスト",
            "done": true,
            "total_duration": 123456
        }"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.response, "件名: テスト");
        assert!(resp.done);
    }

    #[test]
    fn generate_response_defaults_when_fields_missing() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.response, "");
        assert!(!resp.done);
    }
}
