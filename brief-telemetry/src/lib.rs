//! # brief-telemetry
//!
//! Structured logging for the brief generator, built on `tracing`.
//!
//! ## Usage
//!
//! ```rust
//! use brief_telemetry::{LogFormat, init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("brief", LogFormat::Pretty)?;
//!     info!(company = "Contoso", "starting brief");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry};
pub use spans::*;
