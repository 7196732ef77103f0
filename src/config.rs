//! Configuration loaded from `caflow.toml`.
//!
//! Every field has a sensible default, so the file is optional. The
//! `OLLAMA_BASE_URL` environment variable takes precedence over the file for
//! the model server address.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CaflowError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaflowConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Settings for the text-generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Default sampling temperature for plain calls.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Default output-length budget for plain calls.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Per-request timeout budget in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where to look for externally maintained catalog data.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// JSON object of template name → body.
    #[serde(default = "default_templates_file")]
    pub templates_file: PathBuf,

    /// Status classification export carrying `available_templates` per status.
    #[serde(default = "default_status_mapping_file")]
    pub status_mapping_file: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:30b".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_top_p() -> f64 {
    0.9
}

fn default_top_k() -> u32 {
    40
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_templates_file() -> PathBuf {
    PathBuf::from("extracted_templates.json")
}

fn default_status_mapping_file() -> PathBuf {
    PathBuf::from("status_classification.json")
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            templates_file: default_templates_file(),
            status_mapping_file: default_status_mapping_file(),
        }
    }
}

impl CaflowConfig {
    /// Load the configuration from `caflow.toml` in the current directory,
    /// falling back to defaults when the file does not exist.
    pub fn load() -> Result<Self, CaflowError> {
        Self::load_from(Path::new("caflow.toml"))
    }

    /// Load from an explicit path. A missing file yields the defaults; a
    /// present but invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, CaflowError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<CaflowConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment takes precedence over the file for the server address.
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL")
            && !url.is_empty()
        {
            config.llm.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CaflowError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(CaflowError::Config(format!(
                "temperature must be in [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(CaflowError::Config(format!(
                "top_p must be in [0, 1], got {}",
                self.llm.top_p
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CaflowError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
