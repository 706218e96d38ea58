//! Placeholder lookup and in-place edits on a single slide part.

use crate::xml::{NS_A, NS_R, attribute, escape_xml, xml_error};
use brief_core::{BriefError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::ops::Range;

/// Placeholder types that never receive body text.
const NON_BODY_TYPES: [&str; 5] = ["title", "ctrTitle", "dt", "ftr", "sldNum"];
const DEFAULT_RUN_PROPERTIES: &str = r#"<a:rPr lang="en-US" dirty="0"/>"#;

/// A `p:sp` carrying a `p:ph` placeholder marker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlaceholderShape {
    pub span: Range<usize>,
    pub kind: Option<String>,
    pub idx: Option<u32>,
    pub text_body: Option<Range<usize>>,
}

impl PlaceholderShape {
    /// A `p:ph` without `idx` is index 0.
    fn index(&self) -> u32 {
        self.idx.unwrap_or(0)
    }

    fn is_title(&self) -> bool {
        matches!(self.kind.as_deref(), Some("title" | "ctrTitle"))
    }

    fn is_body(&self) -> bool {
        let kind = self.kind.as_deref().unwrap_or_default();
        self.index() != 0 && !NON_BODY_TYPES.contains(&kind)
    }
}

/// What a slide part offers for filling.
#[derive(Debug, Default)]
pub(crate) struct SlideLayout {
    pub placeholders: Vec<PlaceholderShape>,
    pub max_shape_id: u32,
    /// Offset of `</p:spTree>`.
    pub tree_end: Option<usize>,
}

impl SlideLayout {
    pub fn title(&self) -> Option<&PlaceholderShape> {
        self.placeholders
            .iter()
            .find(|p| p.is_title())
            .or_else(|| self.placeholders.iter().find(|p| p.index() == 0))
    }

    pub fn body(&self) -> Option<&PlaceholderShape> {
        self.placeholders.iter().find(|p| p.is_body())
    }
}

#[derive(Default)]
struct OpenShape {
    start: usize,
    kind: Option<String>,
    idx: Option<u32>,
    has_placeholder: bool,
    text_start: Option<usize>,
    text_body: Option<Range<usize>>,
}

impl OpenShape {
    fn mark_placeholder(&mut self, ph: &BytesStart<'_>) {
        self.has_placeholder = true;
        self.kind = attribute(ph, b"type");
        self.idx = attribute(ph, b"idx").and_then(|v| v.parse().ok());
    }
}

pub(crate) fn scan_slide(xml: &str) -> Result<SlideLayout> {
    let mut reader = Reader::from_str(xml);
    let mut layout = SlideLayout::default();
    let mut shape: Option<OpenShape> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| xml_error("malformed slide", e))?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => shape = Some(OpenShape { start: before, ..Default::default() }),
                b"p:ph" => {
                    if let Some(open) = shape.as_mut() {
                        open.mark_placeholder(&e);
                    }
                }
                b"p:txBody" => {
                    if let Some(open) = shape.as_mut() {
                        open.text_start = Some(before);
                    }
                }
                b"p:cNvPr" => layout.max_shape_id = layout.max_shape_id.max(shape_id(&e)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"p:ph" => {
                    if let Some(open) = shape.as_mut() {
                        open.mark_placeholder(&e);
                    }
                }
                b"p:cNvPr" => layout.max_shape_id = layout.max_shape_id.max(shape_id(&e)),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"p:txBody" => {
                    if let Some(open) = shape.as_mut() {
                        open.text_body = open.text_start.take().map(|start| start..after);
                    }
                }
                b"p:sp" => {
                    if let Some(open) = shape.take().filter(|s| s.has_placeholder) {
                        layout.placeholders.push(PlaceholderShape {
                            span: open.start..after,
                            kind: open.kind,
                            idx: open.idx,
                            text_body: open.text_body,
                        });
                    }
                }
                b"p:spTree" => layout.tree_end = Some(before),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(layout)
}

fn shape_id(element: &BytesStart<'_>) -> u32 {
    attribute(element, b"id").and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Pieces of an existing `p:txBody` worth keeping.
#[derive(Debug, Default, PartialEq)]
struct TextBodyParts<'a> {
    body_properties: Option<&'a str>,
    list_style: Option<&'a str>,
    run_properties: Option<&'a str>,
}

#[derive(Clone, Copy)]
enum Kept {
    BodyProperties,
    ListStyle,
    RunProperties,
}

impl Kept {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"a:bodyPr" => Some(Kept::BodyProperties),
            b"a:lstStyle" => Some(Kept::ListStyle),
            b"a:rPr" => Some(Kept::RunProperties),
            _ => None,
        }
    }

    fn name(self) -> &'static [u8] {
        match self {
            Kept::BodyProperties => b"a:bodyPr",
            Kept::ListStyle => b"a:lstStyle",
            Kept::RunProperties => b"a:rPr",
        }
    }
}

impl<'a> TextBodyParts<'a> {
    fn keep(&mut self, kind: Kept, slice: &'a str) {
        let slot = match kind {
            Kept::BodyProperties => &mut self.body_properties,
            Kept::ListStyle => &mut self.list_style,
            Kept::RunProperties => &mut self.run_properties,
        };
        // First occurrence wins.
        slot.get_or_insert(slice);
    }
}

fn scan_text_body(xml: &str) -> Result<TextBodyParts<'_>> {
    let mut reader = Reader::from_str(xml);
    let mut parts = TextBodyParts::default();
    let mut open: Option<(Kept, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| xml_error("malformed text body", e))?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) if open.is_none() => {
                open = Kept::from_name(e.name().as_ref()).map(|kind| (kind, before));
            }
            Event::Empty(e) if open.is_none() => {
                if let Some(kind) = Kept::from_name(e.name().as_ref()) {
                    parts.keep(kind, &xml[before..after]);
                }
            }
            Event::End(e) => {
                if let Some((kind, start)) = open {
                    if e.name().as_ref() == kind.name() {
                        parts.keep(kind, &xml[start..after]);
                        open = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parts)
}

/// Drops a leading bullet marker; the layout supplies its own bullets.
fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    ["- ", "* ", "• "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .unwrap_or(trimmed)
        .trim_end()
}

/// A new `p:txBody` for `shape` holding one paragraph per non-blank line.
pub(crate) fn text_body_xml(slide: &str, shape: &PlaceholderShape, text: &str) -> Result<String> {
    let existing = match &shape.text_body {
        Some(range) => scan_text_body(&slide[range.clone()])?,
        None => TextBodyParts::default(),
    };
    let run_properties = existing.run_properties.unwrap_or(DEFAULT_RUN_PROPERTIES);

    let mut xml = String::from("<p:txBody>");
    xml.push_str(existing.body_properties.unwrap_or("<a:bodyPr/>"));
    xml.push_str(existing.list_style.unwrap_or("<a:lstStyle/>"));

    let mut paragraphs = 0;
    for line in text.lines().map(strip_bullet).filter(|l| !l.is_empty()) {
        xml.push_str(&format!(
            "<a:p><a:r>{run_properties}<a:t>{}</a:t></a:r></a:p>",
            escape_xml(line)
        ));
        paragraphs += 1;
    }
    if paragraphs == 0 {
        xml.push_str("<a:p/>");
    }
    xml.push_str("</p:txBody>");
    Ok(xml)
}

/// The edit that fills `shape` with `text`: either a replacement of its text
/// body or an insertion just before `</p:sp>`.
pub(crate) fn fill_edit(slide: &str, shape: &PlaceholderShape, text: &str) -> Result<(Range<usize>, String)> {
    let body = text_body_xml(slide, shape, text)?;
    let range = match &shape.text_body {
        Some(range) => range.clone(),
        None => {
            let close = slide[shape.span.clone()]
                .rfind("</p:sp>")
                .ok_or_else(|| BriefError::Template("placeholder shape is not closed".to_string()))?;
            let at = shape.span.start + close;
            at..at
        }
    };
    Ok((range, body))
}

/// Position and size in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    /// Right-hand picture area: 45% of the slide width starting at 52%,
    /// 25% down, shrunk to stay above the bottom 5%.
    pub fn picture_area(slide_cx: i64, slide_cy: i64, aspect_ratio: f64) -> Self {
        let x = (slide_cx as f64 * 0.52).round() as i64;
        let y = (slide_cy as f64 * 0.25).round() as i64;
        let mut cx = slide_cx as f64 * 0.45;
        let mut cy = cx * aspect_ratio;
        let max_cy = slide_cy as f64 * 0.95 - y as f64;
        if cy > max_cy {
            cy = max_cy;
            cx = cy / aspect_ratio;
        }
        Self { x, y, cx: cx.round() as i64, cy: cy.round() as i64 }
    }
}

pub(crate) fn picture_xml(id: u32, name: &str, rel_id: &str, frame: Frame) -> String {
    let Frame { x, y, cx, cy } = frame;
    format!(
        r#"<p:pic xmlns:a="{NS_A}" xmlns:r="{NS_R}"><p:nvPicPr><p:cNvPr id="{id}" name="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        escape_xml(name)
    )
}

/// Applies non-overlapping edits, back to front so offsets stay valid.
pub(crate) fn apply_edits(xml: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut out = xml.to_string();
    for (range, replacement) in edits {
        out.replace_range(range, &replacement);
    }
    out
}
