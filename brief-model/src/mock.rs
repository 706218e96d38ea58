use brief_core::{BriefError, Llm, LlmRequest, LlmResponse, LlmResponseStream, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replays canned responses, or a canned error, and records every request.
pub struct MockLlm {
    name: String,
    responses: Vec<LlmResponse>,
    error: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), responses: vec![], error: None, requests: Mutex::new(vec![]) }
    }

    pub fn with_response(mut self, response: LlmResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Make every call fail with `BriefError::Model(message)`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest, _stream: bool) -> Result<LlmResponseStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req);
        }
        if let Some(message) = &self.error {
            return Err(BriefError::Model(message.clone()));
        }

        let responses = self.responses.clone();
        let stream = async_stream::stream! {
            for response in responses {
                yield Ok(response);
            }
        };
        Ok(Box::pin(stream))
    }
}
