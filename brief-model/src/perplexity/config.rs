//! Configuration types for Perplexity provider.

use serde::{Deserialize, Serialize};

/// Default Perplexity API base URL.
pub const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";

/// Configuration for Perplexity API.
///
/// # Example
///
/// ```rust
/// use brief_model::PerplexityConfig;
///
/// let config = PerplexityConfig::new("your-api-key", "sonar")
///     .with_base_url("https://proxy.example.com")
///     .with_max_tokens(2048);
/// assert_eq!(config.effective_base_url(), "https://proxy.example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerplexityConfig {
    /// Perplexity API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Optional custom base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens for output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "sonar".to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: 180,
        }
    }
}

impl PerplexityConfig {
    /// Create a new Perplexity config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Default::default() }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens for output.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Get the effective base URL.
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(PERPLEXITY_API_BASE)
    }
}
