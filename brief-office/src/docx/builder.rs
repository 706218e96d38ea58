use super::chart::chart_xml;
use super::styles::DocumentStyle;
use crate::package::{CONTENT_TYPES_PART, ContentTypes, Package, Relationships};
use crate::xml::{
    EMU_PER_INCH, NS_A, NS_PIC, NS_R, NS_W, NS_WP, REL_CHART, REL_CORE_PROPERTIES,
    REL_EXTENDED_PROPERTIES, REL_IMAGE, REL_OFFICE_DOCUMENT, REL_STYLES, escape_xml,
};
use brief_chart::{BarChart, Figure, Palette};
use brief_core::{BriefError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Extension URI under which Office looks for the SVG twin of a picture.
const SVG_BLIP_EXT: &str = "{96DAC541-7B7A-43D3-8B79-37D633B846F1}";
const NS_ASVG: &str = "http://schemas.microsoft.com/office/drawing/2016/SVG/main";

/// Letter paper with one-inch margins leaves 6.5in of text width.
const MAX_WIDTH_INCHES: f64 = 6.5;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn xml_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

#[derive(Debug, Clone)]
struct CoreProperties {
    title: String,
    creator: String,
    created: DateTime<Utc>,
}

/// A Word document assembled paragraph by paragraph.
///
/// Body XML is accumulated as it is added; [`DocxDocument::to_bytes`] wraps
/// it with styles, relationships, media and charts into a package.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    style: DocumentStyle,
    body: String,
    rels: Relationships,
    media: Vec<(String, Vec<u8>)>,
    charts: Vec<String>,
    core: CoreProperties,
    next_drawing_id: u32,
}

impl Default for DocxDocument {
    fn default() -> Self {
        Self::new(DocumentStyle::default())
    }
}

impl DocxDocument {
    pub fn new(style: DocumentStyle) -> Self {
        let mut rels = Relationships::new();
        rels.add(REL_STYLES, "styles.xml");
        Self {
            style,
            body: String::new(),
            rels,
            media: Vec::new(),
            charts: Vec::new(),
            core: CoreProperties { title: String::new(), creator: String::new(), created: Utc::now() },
            next_drawing_id: 1,
        }
    }

    pub fn style(&self) -> &DocumentStyle {
        &self.style
    }

    fn push_paragraph(&mut self, style: Option<&str>, alignment: Option<Alignment>, text: &str) {
        self.body.push_str("<w:p>");
        if style.is_some() || alignment.is_some() {
            self.body.push_str("<w:pPr>");
            if let Some(style) = style {
                let _ = write!(self.body, r#"<w:pStyle w:val="{style}"/>"#);
            }
            if let Some(alignment) = alignment {
                let _ = write!(self.body, r#"<w:jc w:val="{}"/>"#, alignment.xml_value());
            }
            self.body.push_str("</w:pPr>");
        }
        if !text.is_empty() {
            let _ = write!(self.body, r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape_xml(text));
        }
        self.body.push_str("</w:p>");
    }

    /// Adds a heading. Level 0 is the document title, 1 and 2 are headings.
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<&mut Self> {
        let style = match level {
            0 => "Title",
            1 => "Heading1",
            2 => "Heading2",
            _ => {
                return Err(BriefError::Document(format!(
                    "heading level {level} is not supported (0..=2)"
                )));
            }
        };
        self.push_paragraph(Some(style), None, text);
        Ok(self)
    }

    /// Adds one paragraph per non-blank line of `text`.
    pub fn add_paragraph(&mut self, text: &str) -> &mut Self {
        for line in text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            self.push_paragraph(None, None, line);
        }
        self
    }

    pub fn add_aligned_paragraph(&mut self, text: &str, alignment: Alignment) -> &mut Self {
        self.push_paragraph(None, Some(alignment), text);
        self
    }

    /// Centered figure or table caption.
    pub fn add_caption(&mut self, text: &str) -> &mut Self {
        self.push_paragraph(Some("Caption"), Some(Alignment::Center), text);
        self
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        self
    }

    fn extent(width_inches: f64, aspect_ratio: f64) -> Result<(i64, i64)> {
        if !width_inches.is_finite() || width_inches <= 0.0 {
            return Err(BriefError::Document(format!("invalid figure width {width_inches}in")));
        }
        let width = width_inches.min(MAX_WIDTH_INCHES);
        let cx = (width * EMU_PER_INCH).round() as i64;
        let cy = (width * aspect_ratio * EMU_PER_INCH).round() as i64;
        Ok((cx, cy))
    }

    fn take_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        id
    }

    /// Adds a centered figure: the PNG as the picture and the SVG as its
    /// preferred twin, sized to `width_inches` at the figure's aspect ratio.
    pub fn add_figure(&mut self, figure: &Figure, width_inches: f64) -> Result<&mut Self> {
        if figure.png.is_empty() {
            return Err(BriefError::Document("figure has no PNG fallback".to_string()));
        }
        let (cx, cy) = Self::extent(width_inches, figure.aspect_ratio())?;
        let id = self.take_drawing_id();
        let n = self.media.len() / 2 + 1;

        let png_name = format!("media/image{n}.png");
        let svg_name = format!("media/image{n}.svg");
        let png_rel = self.rels.add(REL_IMAGE, &png_name);
        let svg_rel = self.rels.add(REL_IMAGE, &svg_name);
        self.media.push((png_name, figure.png.clone()));
        self.media.push((svg_name, figure.svg.as_bytes().to_vec()));

        let _ = write!(
            self.body,
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="Figure {id}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{NS_A}" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="{NS_A}"><a:graphicData uri="{NS_PIC}"><pic:pic xmlns:pic="{NS_PIC}"><pic:nvPicPr><pic:cNvPr id="{id}" name="image{n}.png"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{png_rel}"><a:extLst><a:ext uri="{SVG_BLIP_EXT}"><asvg:svgBlip xmlns:asvg="{NS_ASVG}" r:embed="{svg_rel}"/></a:ext></a:extLst></a:blip><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        );
        Ok(self)
    }

    /// Adds a centered native Word chart part for `chart`.
    pub fn add_bar_chart(
        &mut self,
        chart: &BarChart,
        palette: &Palette,
        width_inches: f64,
    ) -> Result<&mut Self> {
        chart.validate()?;
        let (cx, cy) = Self::extent(width_inches, 4.0 / 7.0)?;
        let id = self.take_drawing_id();
        let n = self.charts.len() + 1;
        let rel = self.rels.add(REL_CHART, &format!("charts/chart{n}.xml"));
        self.charts.push(chart_xml(chart, palette));

        let _ = write!(
            self.body,
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="Chart {id}" descr="{}"/><wp:cNvGraphicFramePr/><a:graphic xmlns:a="{NS_A}"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{rel}"/></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            escape_xml(&chart.title)
        );
        Ok(self)
    }

    pub fn set_core_properties(&mut self, title: &str, creator: &str) -> &mut Self {
        self.core.title = title.to_string();
        self.core.creator = creator.to_string();
        self
    }

    /// Body XML accumulated so far, without the document wrapper.
    pub fn body_xml(&self) -> &str {
        &self.body
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{NS_W}" xmlns:r="{NS_R}" xmlns:wp="{NS_WP}" xmlns:a="{NS_A}" xmlns:pic="{NS_PIC}"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            self.body
        )
    }

    fn core_xml(&self) -> String {
        let created = self.core.created.to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>{}</dc:creator><cp:lastModifiedBy>{}</cp:lastModifiedBy><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
            escape_xml(&self.core.title),
            escape_xml(&self.core.creator),
            escape_xml(&self.core.creator),
        )
    }

    fn app_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>brief {}</Application></Properties>"#,
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Serializes the document as a `.docx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut types = ContentTypes::default();
        types.add_override("word/document.xml", CT_DOCUMENT);
        types.add_override("word/styles.xml", CT_STYLES);
        types.add_override("docProps/core.xml", CT_CORE);
        types.add_override("docProps/app.xml", CT_APP);
        if self.media.iter().any(|(n, _)| n.ends_with(".png")) {
            types.add_default("png", "image/png");
        }
        if self.media.iter().any(|(n, _)| n.ends_with(".svg")) {
            types.add_default("svg", "image/svg+xml");
        }
        for n in 1..=self.charts.len() {
            types.add_override(&format!("word/charts/chart{n}.xml"), CT_CHART);
        }

        let mut package_rels = Relationships::new();
        package_rels.add(REL_OFFICE_DOCUMENT, "word/document.xml");
        package_rels.add(REL_CORE_PROPERTIES, "docProps/core.xml");
        package_rels.add(REL_EXTENDED_PROPERTIES, "docProps/app.xml");

        let mut package = Package::new();
        package.set_part(CONTENT_TYPES_PART, types.to_xml().into_bytes());
        package.set_part("_rels/.rels", package_rels.to_xml().into_bytes());
        package.set_part("docProps/core.xml", self.core_xml().into_bytes());
        package.set_part("docProps/app.xml", Self::app_xml().into_bytes());
        package.set_part("word/document.xml", self.document_xml().into_bytes());
        package.set_part("word/styles.xml", self.style.styles_xml().into_bytes());
        package.set_part("word/_rels/document.xml.rels", self.rels.to_xml().into_bytes());
        for (name, data) in &self.media {
            package.set_part(format!("word/{name}"), data.clone());
        }
        for (i, xml) in self.charts.iter().enumerate() {
            package.set_part(format!("word/charts/chart{}.xml", i + 1), xml.clone().into_bytes());
        }
        package.to_bytes()
    }
}
