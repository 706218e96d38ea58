//! # brief-cli
//!
//! The `brief` command-line tool.
//!
//! ## Commands
//!
//! - `brief generate <COMPANY>` - research, strategy, figures and the finished document
//! - `brief figures <COMPANY> --out DIR` - chart and diagram only, no model calls
//! - `brief config` - the effective configuration, secrets redacted
//!
//! Configuration is read from `--config`, `./brief.toml` or
//! `<config_dir>/brief/config.toml`, see [`config::BriefConfig`]. API keys come
//! from the environment, see [`secrets::ApiKeys`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod secrets;

pub use cli::{Cli, Commands, GenerateArgs};
pub use config::BriefConfig;
pub use secrets::ApiKeys;
