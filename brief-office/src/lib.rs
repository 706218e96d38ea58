//! # brief-office
//!
//! Office Open XML output for strategy briefs.
//!
//! ## Overview
//!
//! - [`DocxDocument`] builds a Word report from scratch: styled headings and
//!   paragraphs, SVG figures with PNG fallbacks, and native bar charts.
//! - [`populate_docx`] fills `{{key}}` placeholders in a Word template.
//! - [`populate_pptx`] fills the title and body placeholders of a slide deck
//!   and drops figures onto the slides.
//! - [`Package`] is the in-memory OPC package both paths are built on.
//!
//! ```rust
//! use brief_office::{DocxDocument, DocumentStyle};
//!
//! let mut doc = DocxDocument::new(DocumentStyle::default());
//! doc.add_heading("Strategic Intelligence Brief: Contoso", 0).unwrap();
//! doc.add_paragraph("Operating costs rose 9% in 2024.");
//! let bytes = doc.to_bytes().unwrap();
//! assert!(bytes.starts_with(b"PK"));
//! ```

mod docx;
mod fields;
mod package;
mod pptx;
mod xml;

pub use docx::{Alignment, DocumentStyle, DocxDocument, populate_docx};
pub use fields::TemplateFields;
pub use package::{ContentTypes, Package, Relationship, Relationships};
pub use pptx::{SlideContent, populate_pptx};

/// MIME type of a Word document.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type of a PowerPoint presentation.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
