//! Wire types for Perplexity's OpenAI-compatible chat completions.

use brief_core::{
    CitationMetadata, CitationSource, Content, FinishReason, LlmResponse, UsageMetadata,
};
use serde::{Deserialize, Serialize};

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Message {
    pub role: String,
    pub content: String,
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Chat completion response, or one streamed chunk of it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// URLs the answer cited, in citation-number order.
    #[serde(default)]
    pub citations: Vec<String>,
    /// Richer form of `citations` returned by newer API versions.
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub delta: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Maps core roles onto chat-completion roles.
pub(crate) fn content_to_message(content: &Content) -> Message {
    let role = match content.role.as_str() {
        "model" | "assistant" => "assistant",
        "system" => "system",
        _ => "user",
    };
    Message { role: role.to_string(), content: content.text() }
}

fn finish_reason(raw: &str) -> FinishReason {
    match raw {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

fn citations(response: &ChatCompletionResponse) -> Option<CitationMetadata> {
    let citation_sources: Vec<CitationSource> = if response.search_results.is_empty() {
        response
            .citations
            .iter()
            .map(|uri| CitationSource { uri: Some(uri.clone()), title: None, publication_date: None })
            .collect()
    } else {
        response
            .search_results
            .iter()
            .map(|result| CitationSource {
                uri: Some(result.url.clone()),
                title: result.title.clone(),
                publication_date: result.date.clone(),
            })
            .collect()
    };

    if citation_sources.is_empty() { None } else { Some(CitationMetadata { citation_sources }) }
}

fn usage(response: &ChatCompletionResponse) -> Option<UsageMetadata> {
    response.usage.as_ref().map(|u| UsageMetadata {
        prompt_token_count: u.prompt_tokens as i32,
        candidates_token_count: u.completion_tokens as i32,
        total_token_count: u.total_tokens as i32,
    })
}

/// Converts a complete (non-streamed) response.
pub(crate) fn from_response(response: &ChatCompletionResponse) -> LlmResponse {
    let choice = response.choices.first();
    let text = choice
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.clone())
        .unwrap_or_default();

    LlmResponse {
        content: Some(Content::new("model").with_text(text)),
        usage_metadata: usage(response),
        finish_reason: choice
            .and_then(|c| c.finish_reason.as_deref())
            .map(finish_reason)
            .or(Some(FinishReason::Stop)),
        citation_metadata: citations(response),
        partial: false,
        turn_complete: true,
    }
}

/// Converts one streamed chunk. A chunk carrying a finish reason closes the turn.
pub(crate) fn from_chunk(chunk: &ChatCompletionResponse) -> LlmResponse {
    let choice = chunk.choices.first();
    let text = choice
        .and_then(|c| c.delta.as_ref().or(c.message.as_ref()))
        .and_then(|m| m.content.clone())
        .filter(|t| !t.is_empty());
    let finish = choice.and_then(|c| c.finish_reason.as_deref()).map(finish_reason);

    LlmResponse {
        content: text.map(|t| Content::new("model").with_text(t)),
        usage_metadata: usage(chunk),
        finish_reason: finish,
        citation_metadata: citations(chunk),
        partial: finish.is_none(),
        turn_complete: finish.is_some(),
    }
}
