use brief_chart::Palette;
use brief_office::DocumentStyle;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// House style and cover details of a brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Shown on the cover as "Prepared by: <author>".
    pub author: String,
    /// Last component of the output file name.
    pub file_suffix: String,
    pub confidentiality: String,
    pub font: String,
    pub font_size_pt: f32,
    /// Year the research prompt audits.
    pub target_year: i32,
    #[serde(flatten)]
    pub palette: Palette,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            author: "Strategy Desk".to_string(),
            file_suffix: "Report".to_string(),
            confidentiality: "Strictly Confidential".to_string(),
            font: "Calibri".to_string(),
            font_size_pt: 11.0,
            target_year: 2026,
            palette: Palette::default(),
        }
    }
}

impl Branding {
    /// Word styles in the brand font, with headings in the primary color.
    pub fn document_style(&self) -> DocumentStyle {
        DocumentStyle {
            font: self.font.clone(),
            font_size_pt: self.font_size_pt,
            accent: self.palette.primary,
            text: self.palette.text,
        }
    }

    /// "Prepared by: <author> | <Month YYYY>".
    pub fn byline(&self, date: NaiveDate) -> String {
        format!("Prepared by: {} | {}", self.author, date.format("%B %Y"))
    }
}
