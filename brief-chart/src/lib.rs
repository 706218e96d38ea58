//! # brief-chart
//!
//! Renders the two figures of a strategy brief: the financial trend bar chart
//! and the proposed architecture diagram.
//!
//! Every figure is produced twice from the same geometry. The SVG carries
//! the full figure with text; the PNG carries shapes only and serves as the
//! raster fallback that Office applications display when they cannot render
//! SVG.
//!
//! ```rust
//! use brief_chart::{BarChart, Palette};
//!
//! let figure = BarChart::operational_costs("Contoso").render(&Palette::default()).unwrap();
//! assert!(figure.svg.contains("Contoso: Rising Operational Costs"));
//! assert!(figure.png.starts_with(b"\x89PNG"));
//! ```

mod bar;
mod color;
mod diagram;
mod figure;
mod raster;
mod svg;

pub use bar::{BarChart, DataPoint, MAX_VALUE};
pub use color::{Palette, Rgb};
pub use diagram::{ArchitectureDiagram, Node};
pub use figure::Figure;
