use thiserror::Error;

use crate::ollama::OllamaError;

/// Top-level error type for the caflow library surface.
///
/// The pipeline itself (recommend / parse / generate) is total and never
/// returns these; they cover startup concerns such as configuration and
/// catalog loading, where strict callers want the failure instead of the
/// lenient `*_or_builtin` fallback.
#[derive(Debug, Error)]
pub enum CaflowError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(#[from] OllamaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
