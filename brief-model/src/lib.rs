//! # brief-model
//!
//! Hosted model clients used by the brief generator.
//!
//! ## Overview
//!
//! - [`PerplexityClient`] - search-augmented chat completions (the research call)
//! - [`GeminiClient`] - Google's Gemini `generateContent` API (the strategy call)
//! - [`MockLlm`] - canned responses for tests
//!
//! Both hosted clients speak plain HTTPS through `reqwest`, retry transient
//! failures with [`RetryConfig`], and support single-shot and SSE streaming
//! replies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brief_model::{PerplexityClient, PerplexityConfig};
//!
//! let api_key = std::env::var("PERPLEXITY_API_KEY").unwrap();
//! let client = PerplexityClient::new(PerplexityConfig::new(api_key, "sonar")).unwrap();
//! ```

pub mod gemini;
mod http;
pub mod mock;
pub mod perplexity;
pub mod retry;
mod sse;

pub use gemini::{GEMINI_API_BASE, GeminiClient, GeminiConfig};
pub use mock::MockLlm;
pub use perplexity::{PERPLEXITY_API_BASE, PerplexityClient, PerplexityConfig};
pub use retry::RetryConfig;
