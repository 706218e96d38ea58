//! Gemini provider.
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`
//! and its SSE twin `:streamGenerateContent`). The brief generator uses it for
//! the strategy stage, asking for `application/json` replies.
//!
//! # Environment Variable
//!
//! The CLI reads the key from `GEMINI_KEY`, `GEMINI_API_KEY` or `GOOGLE_API_KEY`.

mod client;
mod config;
mod convert;

pub use client::GeminiClient;
pub use config::{GEMINI_API_BASE, GeminiConfig};
