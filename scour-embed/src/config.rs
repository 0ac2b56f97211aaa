//! Configuration for remote embedding providers

use crate::error::{EmbedError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is supplied explicitly.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for an OpenAI-compatible embeddings endpoint.
///
/// Holds the endpoint base URL, the embedding model name, and the bearer
/// token. The key is resolved from the [`API_KEY_ENV`] environment variable
/// when not set explicitly, and validated once at provider construction so
/// that configuration mistakes surface immediately rather than on the first
/// query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Base URL of the API, without the `/embeddings` suffix
    pub api_base: String,
    /// Embedding model identifier passed to the endpoint
    pub model: String,
    /// Bearer token for the endpoint
    #[serde(skip_serializing, default)]
    pub api_key: String,
}

impl EmbedConfig {
    /// Default API base for hosted OpenAI.
    pub const DEFAULT_API_BASE: &'static str = "https://api.openai.com/v1";
    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-3-small";

    /// Create a configuration for `model`, reading the API key from the
    /// environment.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            model: model.into(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
        }
    }

    /// Default model against hosted OpenAI, key from the environment.
    pub fn from_env() -> Self {
        Self::new(Self::DEFAULT_MODEL)
    }

    /// Override the API base URL (self-hosted or proxy deployments).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the API key instead of reading the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Validate that the configuration is usable.
    ///
    /// A blank model, base URL, or API key is a configuration error, not a
    /// call-time error, so it is reported from here.
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(EmbedError::invalid_config("api_base is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(EmbedError::invalid_config("model is empty"));
        }
        if self.api_key.trim().is_empty() {
            return Err(EmbedError::invalid_config(format!(
                "api_key is empty and {API_KEY_ENV} is not set"
            )));
        }
        Ok(())
    }
}
