//! # brief-agent
//!
//! The two model calls of a strategy brief and everything between them and
//! the finished file.
//!
//! - [`ResearchAgent`] (the Hunter) fetches a forensic audit of the company
//!   from a search-augmented model.
//! - [`StrategyAgent`] (the Architect) turns the research into a typed
//!   [`StrategyMemo`], falling back to a placeholder memo when the model
//!   reply is unusable.
//! - [`compose_report`], [`compose_deck`] and [`template_fields`] map the
//!   memo onto a Word report, a slide deck or template placeholders.
//! - [`Pipeline`] runs the stages in order and returns an [`Artifact`].
//!
//! ```rust,no_run
//! # async fn demo(hunter: std::sync::Arc<dyn brief_core::Llm>, architect: std::sync::Arc<dyn brief_core::Llm>) -> brief_core::Result<()> {
//! use brief_agent::{OutputKind, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .hunter(hunter)
//!     .architect(architect)
//!     .output(OutputKind::Report)
//!     .on_stage(|stage| println!("{}", stage.status()))
//!     .build()?;
//! let artifact = pipeline.run("Contoso").await?;
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! # Ok(())
//! # }
//! ```

mod branding;
mod compose;
mod memo;
mod pipeline;
mod prompts;
mod research;
mod strategy;

pub use branding::Branding;
pub use compose::{ChartMode, Figures, compose_deck, compose_report, financial_chart, template_fields};
pub use memo::{Section, StrategyMemo, parse_memo};
pub use pipeline::{Artifact, OutputKind, Pipeline, PipelineBuilder, Stage, StageCallback, output_file_name};
pub use prompts::{DEFAULT_RESEARCH_PROMPT, DEFAULT_STRATEGY_PROMPT, Prompts};
pub use research::{Research, ResearchAgent};
pub use strategy::{StrategyAgent, StrategyOutcome};
