use crate::prompts::DEFAULT_RESEARCH_PROMPT;
use brief_core::{
    BriefError, CitationSource, Content, GenerateContentConfig, Llm, LlmRequest, Result,
    collect_response, render_prompt,
};
use brief_telemetry::Instrument;
use std::collections::HashMap;
use std::sync::Arc;

/// Research findings about one company.
#[derive(Debug, Clone, PartialEq)]
pub struct Research {
    pub company: String,
    pub text: String,
    /// Cited sources, deduplicated by URI in citation order.
    pub sources: Vec<CitationSource>,
}

/// The Hunter: asks a search-augmented model for a forensic audit of a company.
pub struct ResearchAgent {
    model: Arc<dyn Llm>,
    prompt: String,
    target_year: i32,
    temperature: Option<f32>,
    stream: bool,
}

impl std::fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("model", &self.model.name())
            .field("target_year", &self.target_year)
            .field("stream", &self.stream)
            .finish()
    }
}

impl ResearchAgent {
    pub fn new(model: Arc<dyn Llm>) -> Self {
        Self {
            model,
            prompt: DEFAULT_RESEARCH_PROMPT.to_string(),
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

    fn build_request(&self, company: &str) -> Result<LlmRequest> {
        let year = self.target_year.to_string();
        let vars = HashMap::from([("company", company), ("year", year.as_str())]);
        let prompt = render_prompt(&self.prompt, &vars)?;

        let mut request = LlmRequest::new(self.model.name(), vec![Content::user(prompt)]);
        if self.temperature.is_some() {
            request = request.with_config(GenerateContentConfig {
                temperature: self.temperature,
                ..Default::default()
            });
        }
        Ok(request)
    }

    /// Runs the research call. Every failure propagates: a brief without
    /// research has nothing to say.
    pub async fn research(&self, company: &str) -> Result<Research> {
        let request = self.build_request(company)?;
        let span = brief_telemetry::model_call_span("hunter", self.model.name());

        let response = async {
            let stream = self.model.generate_content(request, self.stream).await?;
            collect_response(stream).await
        }
        .instrument(span)
        .await?;

        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(BriefError::Agent(format!("research for '{company}' came back empty")));
        }

        let mut sources: Vec<CitationSource> = Vec::new();
        for source in response.citation_metadata.into_iter().flat_map(|c| c.citation_sources) {
            let duplicate = source.uri.is_some() && sources.iter().any(|s| s.uri == source.uri);
            if !duplicate {
                sources.push(source);
            }
        }

        brief_telemetry::info!(
            company = %company,
            chars = text.len(),
            sources = sources.len(),
            "research complete"
        );
        Ok(Research { company: company.to_string(), text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::{CitationMetadata, LlmResponse};
    use brief_model::MockLlm;

    fn reply(text: &str) -> LlmResponse {
        LlmResponse::new(Content::new("model").with_text(text))
    }

    fn source(uri: &str) -> CitationSource {
        CitationSource { uri: Some(uri.to_string()), title: None, publication_date: None }
    }

    #[tokio::test]
    async fn renders_company_and_year_into_prompt() {
        let model = Arc::new(MockLlm::new("sonar").with_response(reply("  OpEx up 9%  ")));
        let agent = ResearchAgent::new(model.clone())
            .with_prompt("Audit {company} in {year}")
            .with_target_year(2027);

        let research = agent.research("Contoso").await.unwrap();
        assert_eq!(research.text, "OpEx up 9%");
        assert!(research.sources.is_empty());

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].contents[0].text(), "Audit Contoso in 2027");
        assert_eq!(requests[0].model, "sonar");
    }

    #[tokio::test]
    async fn sources_are_deduplicated() {
        let mut response = reply("findings");
        response.citation_metadata = Some(CitationMetadata {
            citation_sources: vec![source("https://a.example/10-k"), source("https://b.example"), source("https://a.example/10-k")],
        });
        let model = Arc::new(MockLlm::new("sonar").with_response(response));

        let research = ResearchAgent::new(model).research("Contoso").await.unwrap();
        let uris: Vec<_> = research.sources.iter().filter_map(|s| s.uri.as_deref()).collect();
        assert_eq!(uris, ["https://a.example/10-k", "https://b.example"]);
    }

    #[tokio::test]
    async fn blank_reply_is_an_agent_error() {
        let model = Arc::new(MockLlm::new("sonar").with_response(reply("\n")));
        let err = ResearchAgent::new(model).research("Contoso").await.unwrap_err();
        assert!(matches!(err, BriefError::Agent(_)));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let model = Arc::new(MockLlm::new("sonar").with_error("Perplexity API error (401, non-retryable)"));
        let err = ResearchAgent::new(model).research("Contoso").await.unwrap_err();
        assert!(matches!(err, BriefError::Model(_)));
    }

    #[tokio::test]
    async fn unknown_prompt_variable_fails_before_the_call() {
        let model = Arc::new(MockLlm::new("sonar").with_response(reply("x")));
        let agent = ResearchAgent::new(model.clone()).with_prompt("Audit {company} for {quarter}");
        assert!(matches!(agent.research("Contoso").await, Err(BriefError::Template(_))));
        assert!(model.requests().is_empty());
    }
}
