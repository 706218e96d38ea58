mod slide;
mod template;

pub use template::{SlideContent, populate_pptx};
