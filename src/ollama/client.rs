use std::time::Duration;

use reqwest::Client;

use super::error::OllamaError;
use super::types::{GenerateOptions, GenerateRequest, GenerateResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstraction over the text-generation call, so the orchestrator can be
/// exercised with mock backends in tests.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Model identifier recorded in generation metadata.
    fn model_name(&self) -> &str;

    /// Generate raw text for a prompt with per-call sampling settings.
    async fn generate(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, OllamaError>;
}

/// HTTP client for a locally hosted Ollama model server.
pub struct OllamaClient {
    client: Client,
    api_url: String,
    model: String,
    top_p: f64,
    top_k: u32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_timeout(base_url, model, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout budget.
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
            top_p: 0.9,
            top_k: 40,
        }
    }

    /// Override the decoding parameters sent with every request.
    pub fn sampling(mut self, top_p: f64, top_k: u32) -> Self {
        self.top_p = top_p;
        self.top_k = top_k;
        self
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, "qwen3:30b")
    }
}

impl TextGenerator for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, OllamaError> {
        let req = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
                top_p: self.top_p,
                top_k: self.top_k,
            },
        };

        let response = self.client.post(&self.api_url).json(&req).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(OllamaError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<GenerateResponse>().await?;
        Ok(body.response.trim().to_string())
    }
}
