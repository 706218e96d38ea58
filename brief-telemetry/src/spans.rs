//! Span helpers for the pipeline stages
//!
//! Provides pre-configured spans so every stage logs with the same field names.

use tracing::Span;

/// Create the root span of one brief generation
///
/// # Example
/// ```
/// use brief_telemetry::pipeline_span;
/// let span = pipeline_span("Contoso", "run-123");
/// let _enter = span.enter();
/// ```
pub fn pipeline_span(company: &str, run_id: &str) -> Span {
    tracing::info_span!("brief.run", company = company, run.id = run_id)
}

/// Create a span for one pipeline stage (research, strategy, chart, ...)
pub fn stage_span(stage: &str) -> Span {
    tracing::info_span!("brief.stage", stage = stage)
}

/// Create a span for a hosted model API call
///
/// # Example
/// ```
/// use brief_telemetry::model_call_span;
/// let span = model_call_span("perplexity", "sonar");
/// let _enter = span.enter();
/// ```
pub fn model_call_span(provider: &str, model_name: &str) -> Span {
    tracing::info_span!("model.call", model.provider = provider, model.name = model_name)
}
