use crate::memo::{StrategyMemo, parse_memo};
use crate::prompts::DEFAULT_STRATEGY_PROMPT;
use crate::research::Research;
use brief_core::{Content, GenerateContentConfig, Llm, LlmRequest, Result, collect_response, render_prompt};
use brief_telemetry::Instrument;
use std::collections::HashMap;
use std::sync::Arc;

const JSON_MIME_TYPE: &str = "application/json";

/// A memo plus whether it is the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub memo: StrategyMemo,
    /// Set when the model failed or its reply could not be parsed.
    pub degraded: bool,
}

/// The Architect: turns research into a structured strategy memo.
pub struct StrategyAgent {
    model: Arc<dyn Llm>,
    prompt: String,
    target_year: i32,
    temperature: Option<f32>,
    stream: bool,
}

impl std::fmt::Debug for StrategyAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyAgent")
            .field("model", &self.model.name())
            .field("target_year", &self.target_year)
            .field("stream", &self.stream)
            .finish()
    }
}

impl StrategyAgent {
    pub fn new(model: Arc<dyn Llm>) -> Self {
        Self {
            model,
            prompt: DEFAULT_STRATEGY_PROMPT.to_string(),
            target_year: 2026,
            temperature: None,
            stream: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_target_year(mut self, year: i32) -> Self {
        self.target_year = year;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    fn build_request(&self, research: &Research) -> Result<LlmRequest> {
        let year = self.target_year.to_string();
        let vars = HashMap::from([
            ("company", research.company.as_str()),
            ("research", research.text.as_str()),
            ("year", year.as_str()),
        ]);
        let prompt = render_prompt(&self.prompt, &vars)?;

        Ok(LlmRequest::new(self.model.name(), vec![Content::user(prompt)])
            .with_config(GenerateContentConfig { temperature: self.temperature, ..Default::default() })
            .with_response_mime_type(JSON_MIME_TYPE))
    }

    async fn call(&self, request: LlmRequest) -> Result<StrategyMemo> {
        let stream = self.model.generate_content(request, self.stream).await?;
        let response = collect_response(stream).await?;
        parse_memo(&response.text())
    }

    /// Writes the memo for `research`.
    ///
    /// A broken prompt template is an error. Model and parsing failures
    /// degrade to [`StrategyMemo::fallback`].
    pub async fn strategize(&self, research: &Research) -> Result<StrategyOutcome> {
        let request = self.build_request(research)?;
        let span = brief_telemetry::model_call_span("architect", self.model.name());

        match self.call(request).instrument(span).await {
            Ok(memo) => {
                brief_telemetry::info!(title = %memo.title, financials = memo.financials.is_some(), "memo ready");
                Ok(StrategyOutcome { memo, degraded: false })
            }
            Err(e) => {
                brief_telemetry::warn!(error = %e, company = %research.company, "strategy failed; using fallback memo");
                Ok(StrategyOutcome { memo: StrategyMemo::fallback(&research.company), degraded: true })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::{BriefError, LlmResponse};
    use brief_model::MockLlm;

    fn research() -> Research {
        Research { company: "Contoso".to_string(), text: "OpEx up 9%".to_string(), sources: vec![] }
    }

    fn reply(text: &str) -> LlmResponse {
        LlmResponse::new(Content::new("model").with_text(text))
    }

    const MEMO: &str = r#"{"title": "Margin Rescue", "executive_summary": "a", "problem_statement": "b",
        "solution_architecture": "c", "roi_analysis": "d", "implementation_plan": "e"}"#;

    #[tokio::test]
    async fn requests_json_and_parses_memo() {
        let model = Arc::new(MockLlm::new("gemini-2.5-pro").with_response(reply(MEMO)));
        let outcome = StrategyAgent::new(model.clone()).with_temperature(0.4).strategize(&research()).await.unwrap();

        assert!(!outcome.degraded);
        assert_eq!(outcome.memo.title, "Margin Rescue");

        let request = &model.requests()[0];
        let config = request.config.as_ref().unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some(JSON_MIME_TYPE));
        assert_eq!(config.temperature, Some(0.4));
        assert!(request.contents[0].text().contains("Based on this research for Contoso: OpEx up 9%"));
    }

    #[tokio::test]
    async fn streamed_chunks_are_joined_before_parsing() {
        let (head, tail) = MEMO.split_at(20);
        let mut first = reply(head);
        first.partial = true;
        first.turn_complete = false;
        let model = Arc::new(MockLlm::new("gemini").with_response(first).with_response(reply(tail)));

        let outcome = StrategyAgent::new(model).with_stream(true).strategize(&research()).await.unwrap();
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn model_failure_degrades_to_fallback() {
        let model = Arc::new(MockLlm::new("gemini").with_error("Gemini API error (503, retryable)"));
        let outcome = StrategyAgent::new(model).strategize(&research()).await.unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.memo, StrategyMemo::fallback("Contoso"));
    }

    #[tokio::test]
    async fn unparseable_reply_degrades_to_fallback() {
        let model = Arc::new(MockLlm::new("gemini").with_response(reply("{'title': 'eval me'}")));
        let outcome = StrategyAgent::new(model).strategize(&research()).await.unwrap();
        assert!(outcome.degraded);
    }

    #[tokio::test]
    async fn broken_prompt_is_an_error() {
        let model = Arc::new(MockLlm::new("gemini").with_response(reply(MEMO)));
        let err = StrategyAgent::new(model).with_prompt("{missing}").strategize(&research()).await.unwrap_err();
        assert!(matches!(err, BriefError::Template(_)));
    }
}
