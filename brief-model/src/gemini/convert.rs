//! Wire types for the Gemini `generateContent` API.

use brief_core::{
    BriefError, CitationMetadata, CitationSource, Content, FinishReason, GenerateContentConfig,
    LlmRequest, LlmResponse, Part, Result, UsageMetadata,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub citation_metadata: Option<GeminiCitationMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// Response parts can be text, thoughts, or non-text payloads we ignore.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiCitationMetadata {
    #[serde(default, alias = "citations")]
    pub citation_sources: Vec<GeminiCitationSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiCitationSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: i32,
    #[serde(default)]
    pub candidates_token_count: i32,
    #[serde(default)]
    pub total_token_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Builds the request body. System messages move to `systemInstruction`; any
/// other non-model role is sent as `user`.
pub(crate) fn build_request(
    request: &LlmRequest,
    defaults: &GenerationConfig,
) -> GenerateContentRequest {
    let mut contents = Vec::new();
    let mut system_parts: Vec<Part> = Vec::new();

    for content in &request.contents {
        match content.role.as_str() {
            "system" => system_parts.extend(content.parts.iter().cloned()),
            "model" | "assistant" => contents
                .push(Content { role: "model".to_string(), parts: content.parts.clone() }),
            _ => contents.push(Content { role: "user".to_string(), parts: content.parts.clone() }),
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(Content { role: "system".to_string(), parts: system_parts })
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: Some(merge_config(request.config.as_ref(), defaults)),
    }
}

fn merge_config(
    request: Option<&GenerateContentConfig>,
    defaults: &GenerationConfig,
) -> GenerationConfig {
    GenerationConfig {
        temperature: request.and_then(|c| c.temperature).or(defaults.temperature),
        top_p: request.and_then(|c| c.top_p).or(defaults.top_p),
        max_output_tokens: request
            .and_then(|c| c.max_output_tokens)
            .or(defaults.max_output_tokens),
        response_mime_type: request.and_then(|c| c.response_mime_type.clone()),
    }
}

fn finish_reason(raw: &str) -> FinishReason {
    match raw {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => FinishReason::Safety,
        "RECITATION" => FinishReason::Recitation,
        _ => FinishReason::Other,
    }
}

/// Converts a complete response or one streamed chunk.
///
/// # Errors
///
/// A reply without candidates whose prompt was blocked is a `BriefError::Model`.
pub(crate) fn from_response(response: &GenerateContentResponse, partial: bool) -> Result<LlmResponse> {
    let Some(candidate) = response.candidates.first() else {
        if let Some(reason) =
            response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref())
        {
            return Err(BriefError::Model(format!("Gemini blocked the prompt: {reason}")));
        }
        return Ok(LlmResponse {
            usage_metadata: usage(response),
            partial,
            turn_complete: !partial,
            ..Default::default()
        });
    };

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts.iter().filter(|p| !p.thought).filter_map(|p| p.text.as_deref()).collect()
        })
        .unwrap_or_default();

    let finish = candidate.finish_reason.as_deref().map(finish_reason);
    let citation_metadata = candidate.citation_metadata.as_ref().and_then(|meta| {
        let citation_sources: Vec<CitationSource> = meta
            .citation_sources
            .iter()
            .map(|s| CitationSource {
                uri: s.uri.clone(),
                title: s.title.clone(),
                publication_date: None,
            })
            .collect();
        (!citation_sources.is_empty()).then_some(CitationMetadata { citation_sources })
    });

    // A streamed chunk that carries a finish reason is the last one.
    let partial = partial && finish.is_none();

    Ok(LlmResponse {
        content: (!text.is_empty() || !partial).then(|| Content::new("model").with_text(text)),
        usage_metadata: usage(response),
        finish_reason: finish,
        citation_metadata,
        partial,
        turn_complete: !partial,
    })
}

fn usage(response: &GenerateContentResponse) -> Option<UsageMetadata> {
    response.usage_metadata.as_ref().map(|u| UsageMetadata {
        prompt_token_count: u.prompt_token_count,
        candidates_token_count: u.candidates_token_count,
        total_token_count: u.total_token_count,
    })
}
