//! Perplexity provider.
//!
//! Perplexity's `sonar` models answer chat completions with live web search
//! and return the URLs they cited. The brief generator uses it for the
//! research stage.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use brief_model::perplexity::{PerplexityClient, PerplexityConfig};
//!
//! let config = PerplexityConfig::new("your-api-key", "sonar");
//! let client = PerplexityClient::new(config)?;
//! ```
//!
//! # Environment Variable
//!
//! The CLI reads the key from `PPLX_KEY` or `PERPLEXITY_API_KEY`.

mod client;
mod config;
mod convert;

pub use client::PerplexityClient;
pub use config::{PERPLEXITY_API_BASE, PerplexityConfig};
