//! # brief-core
//!
//! Core traits and types shared by every stage of the brief generator.
//!
//! ## Overview
//!
//! - [`Llm`] - the trait implemented by the research and strategy backends
//! - [`LlmRequest`] / [`LlmResponse`] - provider-neutral request and reply
//! - [`render_prompt`] - `{variable}` substitution for configurable prompts
//! - [`BriefError`] / [`Result`] - unified error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use brief_core::{Content, LlmRequest};
//!
//! let request = LlmRequest::new("sonar", vec![Content::user("Audit Contoso")])
//!     .with_response_mime_type("text/plain");
//! assert_eq!(request.contents.len(), 1);
//! ```

pub mod error;
pub mod model;
pub mod prompt_template;
pub mod types;

pub use error::{BriefError, Result};
pub use model::{
    CitationMetadata, CitationSource, FinishReason, GenerateContentConfig, Llm, LlmRequest,
    LlmResponse, LlmResponseStream, UsageMetadata, collect_response,
};
pub use prompt_template::render_prompt;
pub use types::{Content, Part};
