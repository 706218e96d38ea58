//! Gemini client implementation.

use super::config::GeminiConfig;
use super::convert::{self, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::http::{build_client, check_status};
use crate::retry::{RetryConfig, execute_with_retry, is_retryable_model_error};
use crate::sse::SseBuffer;
use async_stream::try_stream;
use async_trait::async_trait;
use brief_core::{BriefError, Llm, LlmRequest, LlmResponseStream};
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    retry_config: RetryConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns `BriefError::Config` for an empty API key and `BriefError::Model`
    /// if the HTTP client fails to initialize.
    pub fn new(config: GeminiConfig) -> Result<Self, BriefError> {
        if config.api_key.trim().is_empty() {
            return Err(BriefError::Config("Gemini API key is empty".to_string()));
        }
        let client = build_client("Gemini", Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    fn api_url(&self, stream: bool) -> String {
        let base = self.config.effective_base_url().trim_end_matches('/');
        let model = self.config.model_id();
        if stream {
            format!("{base}/models/{model}:streamGenerateContent?alt=sse")
        } else {
            format!("{base}/models/{model}:generateContent")
        }
    }

    fn build_request(&self, request: &LlmRequest) -> GenerateContentRequest {
        let defaults = GenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            ..Default::default()
        };
        convert::build_request(request, &defaults)
    }
}

#[async_trait]
impl Llm for GeminiClient {
    fn name(&self) -> &str {
        self.config.model_id()
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, BriefError> {
        let api_url = self.api_url(stream);
        let api_key = self.config.api_key.clone();
        let body = self.build_request(&request);
        let client = self.client.clone();
        let retry_config = self.retry_config.clone();

        brief_telemetry::debug!(
            model = %self.config.model_id(),
            contents = body.contents.len(),
            stream,
            "Sending Gemini generateContent"
        );

        let response_stream = try_stream! {
            let response = execute_with_retry(&retry_config, is_retryable_model_error, || {
                let client = client.clone();
                let api_url = api_url.clone();
                let api_key = api_key.clone();
                let body = body.clone();
                async move {
                    let response = client
                        .post(&api_url)
                        .header("x-goog-api-key", &api_key)
                        .json(&body)
                        .send()
                        .await
                        .map_err(|e| BriefError::Model(format!("Gemini API request failed: {e}")))?;
                    check_status("Gemini", response).await
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
                        match serde_json::from_str::<GenerateContentResponse>(&data) {
                            Ok(parsed) => {
                                yield convert::from_response(&parsed, true)?;
                            }
                            Err(e) => {
                                brief_telemetry::warn!("Failed to parse Gemini chunk: {} - {}", e, data);
                            }
                        }
                    }
                }

                if let Some(data) = buffer.finish() {
                    if let Ok(parsed) = serde_json::from_str::<GenerateContentResponse>(&data) {
                        yield convert::from_response(&parsed, true)?;
                    }
                }
            } else {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| BriefError::Model(format!("Failed to read response: {e}")))?;

                let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
                    .map_err(|e| {
                        BriefError::Model(format!("Failed to parse response: {e} - {response_text}"))
                    })?;

                yield convert::from_response(&parsed, false)?;
            }
        };

        Ok(Box::pin(response_stream))
    }
}
