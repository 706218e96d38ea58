mod builder;
mod chart;
mod styles;
mod template;

pub use builder::{Alignment, DocxDocument};
pub use styles::DocumentStyle;
pub use template::populate_docx;
