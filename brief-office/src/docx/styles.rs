use crate::xml::escape_xml;
use brief_chart::Rgb;

/// Fonts and colors applied to a generated report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyle {
    pub font: String,
    pub font_size_pt: f32,
    /// Heading and title color.
    pub accent: Rgb,
    pub text: Rgb,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            font: "Calibri".to_string(),
            font_size_pt: 11.0,
            accent: Rgb::new(0x00, 0x4c, 0x6d),
            text: Rgb::new(0x22, 0x22, 0x22),
        }
    }
}

impl DocumentStyle {
    /// Word sizes are in half-points.
    fn half_points(size_pt: f32) -> u32 {
        (size_pt * 2.0).round().max(2.0) as u32
    }

    pub(crate) fn styles_xml(&self) -> String {
        let font = escape_xml(&self.font);
        let body = Self::half_points(self.font_size_pt);
        let accent = self.accent.hex();
        let text = self.text.hex();

        let heading = |id: &str, name: &str, size_pt: f32, before: u32, outline: u8| {
            format!(
                r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="{before}" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr><w:rPr><w:b/><w:color w:val="{accent}"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr></w:style>"#,
                sz = Self::half_points(size_pt),
            )
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{ns}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:color w:val="{text}"/><w:sz w:val="{body}"/><w:szCs w:val="{body}"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="264" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="10"/><w:qFormat/><w:pPr><w:spacing w:after="240"/><w:contextualSpacing/></w:pPr><w:rPr><w:b/><w:color w:val="{accent}"/><w:kern w:val="28"/><w:sz w:val="52"/><w:szCs w:val="52"/></w:rPr></w:style>{h1}{h2}<w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="35"/><w:qFormat/><w:pPr><w:spacing w:after="200"/></w:pPr><w:rPr><w:i/><w:iCs/><w:color w:val="{accent}"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr></w:style></w:styles>"#,
            ns = crate::xml::NS_W,
            h1 = heading("Heading1", "heading 1", 16.0, 360, 0),
            h2 = heading("Heading2", "heading 2", 13.0, 200, 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_carry_font_size_and_accent() {
        let style = DocumentStyle { font: "Georgia".to_string(), font_size_pt: 10.5, ..Default::default() };
        let xml = style.styles_xml();

        assert!(xml.contains(r#"w:ascii="Georgia""#));
        assert!(xml.contains(r#"<w:sz w:val="21"/>"#));
        for id in ["Normal", "Title", "Heading1", "Heading2", "Caption"] {
            assert!(xml.contains(&format!(r#"w:styleId="{id}""#)), "{id}");
        }
        assert!(xml.contains(r#"<w:color w:val="004C6D"/>"#));
    }
}
