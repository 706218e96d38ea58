//! Perplexity client implementation.

use super::config::PerplexityConfig;
use super::convert::{self, ChatCompletionRequest, ChatCompletionResponse};
use crate::http::{build_client, check_status};
use crate::retry::{RetryConfig, execute_with_retry, is_retryable_model_error};
use crate::sse::SseBuffer;
use async_stream::try_stream;
use async_trait::async_trait;
use brief_core::{BriefError, Llm, LlmRequest, LlmResponseStream};
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

/// Perplexity client for search-augmented chat completions.
///
/// # Example
///
/// ```rust,ignore
/// use brief_model::perplexity::{PerplexityClient, PerplexityConfig};
///
/// let client = PerplexityClient::new(PerplexityConfig::new(
///     std::env::var("PERPLEXITY_API_KEY").unwrap(),
///     "sonar",
/// ))?;
/// ```
pub struct PerplexityClient {
    client: Client,
    config: PerplexityConfig,
    retry_config: RetryConfig,
}

impl PerplexityClient {
    /// Create a new Perplexity client.
    ///
    /// # Errors
    ///
    /// Returns `BriefError::Config` for an empty API key and `BriefError::Model`
    /// if the HTTP client fails to initialize.
    pub fn new(config: PerplexityConfig) -> Result<Self, BriefError> {
        if config.api_key.trim().is_empty() {
            return Err(BriefError::Config("Perplexity API key is empty".to_string()));
        }
        let client = build_client("Perplexity", Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    /// Set a retry configuration, consuming and returning `self`.
    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Build the API URL for chat completions.
    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.effective_base_url().trim_end_matches('/'))
    }

    /// Build a chat completion request from an LLM request.
    fn build_request(&self, request: &LlmRequest, stream: bool) -> ChatCompletionRequest {
        let messages = request.contents.iter().map(convert::content_to_message).collect();
        let config = request.config.as_ref();

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: config.and_then(|c| c.temperature).or(self.config.temperature),
            top_p: config.and_then(|c| c.top_p),
            max_tokens: config
                .and_then(|c| c.max_output_tokens)
                .map(|t| t as u32)
                .or(self.config.max_tokens),
            stream,
        }
    }
}

#[async_trait]
impl Llm for PerplexityClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, BriefError> {
        let api_url = self.api_url();
        let api_key = self.config.api_key.clone();
        let chat_request = self.build_request(&request, stream);
        let client = self.client.clone();
        let retry_config = self.retry_config.clone();

        brief_telemetry::debug!(
            model = %chat_request.model,
            messages = chat_request.messages.len(),
            stream,
            "Sending Perplexity chat completion"
        );

        let response_stream = try_stream! {
            // Retries only cover request setup/execution. Stream failures after start are surfaced
            // directly and are not auto-replayed.
            let response = execute_with_retry(&retry_config, is_retryable_model_error, || {
                let client = client.clone();
                let api_url = api_url.clone();
                let api_key = api_key.clone();
                let chat_request = chat_request.clone();
                async move {
                    let response = client
                        .post(&api_url)
                        .bearer_auth(&api_key)
                        .json(&chat_request)
                        .send()
                        .await
                        .map_err(|e| BriefError::Model(format!("Perplexity API request failed: {e}")))?;
                    check_status("Perplexity", response).await
                }
            })
            .await?;

            if stream {
                let mut byte_stream = response.bytes_stream();
                let mut buffer = SseBuffer::default();

                while let Some(chunk) = byte_stream.next().await {
                    let chunk = chunk
                        .map_err(|e| BriefError::Model(format!("Stream read error: {e}")))?;

                    for data in buffer.push(&chunk) {
                        match serde_json::from_str::<ChatCompletionResponse>(&data) {
                            Ok(parsed) => {
                                yield convert::from_chunk(&parsed);
                            }
                            Err(e) => {
                                brief_telemetry::warn!("Failed to parse Perplexity chunk: {} - {}", e, data);
                            }
                        }
                    }
                }

                if let Some(data) = buffer.finish() {
                    if let Ok(parsed) = serde_json::from_str::<ChatCompletionResponse>(&data) {
                        yield convert::from_chunk(&parsed);
                    }
                }
            } else {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| BriefError::Model(format!("Failed to read response: {e}")))?;

                let chat_response: ChatCompletionResponse = serde_json::from_str(&response_text)
                    .map_err(|e| {
                        BriefError::Model(format!("Failed to parse response: {e} - {response_text}"))
                    })?;

                yield convert::from_response(&chat_response);
            }
        };

        Ok(Box::pin(response_stream))
    }
}
