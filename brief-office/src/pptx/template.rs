use super::slide::{Frame, apply_edits, fill_edit, picture_xml, scan_slide};
use crate::package::{CONTENT_TYPES_PART, ContentTypes, Package, Relationships, rels_path_for, resolve_target};
use crate::xml::{REL_IMAGE, attribute, utf8, xml_error};
use brief_chart::Figure;
use brief_core::{BriefError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
/// 13.333in x 7.5in, the 16:9 default.
const DEFAULT_SLIDE_SIZE: (i64, i64) = (12_192_000, 6_858_000);

/// Text and picture destined for one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideContent {
    pub title: Option<String>,
    /// One paragraph per line; a leading `- `, `* ` or `• ` is dropped.
    pub body: Option<String>,
    pub picture: Option<Figure>,
}

impl SlideContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_picture(mut self, picture: Figure) -> Self {
        self.picture = Some(picture);
        self
    }
}

struct PresentationInfo {
    slide_rel_ids: Vec<String>,
    size: (i64, i64),
}

fn read_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut reader = Reader::from_str(xml);
    let mut info = PresentationInfo { slide_rel_ids: Vec::new(), size: DEFAULT_SLIDE_SIZE };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.name().as_ref() {
                b"p:sldId" => {
                    // The relationship id is the namespaced `r:id`, not the numeric `id`.
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref().ends_with(b":id"))
                        .and_then(|a| std::str::from_utf8(&a.value).ok().map(str::to_string));
                    if let Some(rel_id) = rel_id {
                        info.slide_rel_ids.push(rel_id);
                    }
                }
                b"p:sldSz" => {
                    let cx = attribute(&e, b"cx").and_then(|v| v.parse().ok());
                    let cy = attribute(&e, b"cy").and_then(|v| v.parse().ok());
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        info.size = (cx, cy);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("malformed ppt/presentation.xml", e)),
        }
    }
    Ok(info)
}

/// Slide part names in presentation order.
fn slide_parts(package: &Package, info: &PresentationInfo) -> Result<Vec<String>> {
    let rels_part = rels_path_for(PRESENTATION_PART);
    let rels = Relationships::parse(&utf8(&rels_part, package.require(&rels_part)?)?)?;
    info.slide_rel_ids
        .iter()
        .map(|id| {
            rels.get(id)
                .map(|rel| resolve_target(PRESENTATION_PART, &rel.target))
                .ok_or_else(|| BriefError::Template(format!("slide relationship '{id}' not found")))
        })
        .collect()
}

fn next_media_index(package: &Package) -> usize {
    (1..)
        .find(|n| !package.contains(&format!("ppt/media/brief{n}.png")))
        .unwrap_or(1)
}

/// Fills the title and body placeholders of each slide, in presentation
/// order, and places the picture of each [`SlideContent`] on its slide.
pub fn populate_pptx(template: &[u8], contents: &[SlideContent]) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(template)?;
    let info = read_presentation(&utf8(PRESENTATION_PART, package.require(PRESENTATION_PART)?)?)?;
    let slides = slide_parts(&package, &info)?;

    if contents.len() > slides.len() {
        brief_telemetry::warn!(
            slides = slides.len(),
            contents = contents.len(),
            "template has fewer slides than contents; extra contents skipped"
        );
    }

    let mut added_picture = false;
    for (number, (slide_part, content)) in slides.iter().zip(contents).enumerate() {
        let number = number + 1;
        let xml = utf8(slide_part, package.require(slide_part)?)?;
        let layout = scan_slide(&xml)?;
        let mut edits = Vec::new();

        if let Some(title) = &content.title {
            match layout.title() {
                Some(shape) => edits.push(fill_edit(&xml, shape, title)?),
                None => brief_telemetry::warn!(slide = number, "slide has no title placeholder; title unused"),
            }
        }
        if let Some(body) = &content.body {
            match layout.body() {
                Some(shape) => edits.push(fill_edit(&xml, shape, body)?),
                None => brief_telemetry::warn!(slide = number, "slide has no body placeholder; body unused"),
            }
        }

        if let Some(figure) = &content.picture {
            let tree_end = layout.tree_end.ok_or_else(|| {
                BriefError::Template(format!("{slide_part} has no shape tree"))
            })?;
            let media = format!("brief{}.png", next_media_index(&package));

            let rels_part = rels_path_for(slide_part);
            let mut rels = match package.part(&rels_part) {
                Some(bytes) => Relationships::parse(&utf8(&rels_part, bytes)?)?,
                None => Relationships::new(),
            };
            let rel_id = rels.add(REL_IMAGE, &format!("../media/{media}"));

            let (slide_cx, slide_cy) = info.size;
            let frame = Frame::picture_area(slide_cx, slide_cy, figure.aspect_ratio());
            let pic = picture_xml(layout.max_shape_id + 1, &media, &rel_id, frame);
            edits.push((tree_end..tree_end, pic));

            package.set_part(format!("ppt/media/{media}"), figure.png.clone());
            package.set_part(rels_part, rels.to_xml().into_bytes());
            added_picture = true;
        }

        brief_telemetry::debug!(slide = number, part = %slide_part, edits = edits.len(), "filled slide");
        if !edits.is_empty() {
            package.set_part(slide_part.clone(), apply_edits(&xml, edits).into_bytes());
        }
    }

    if added_picture {
        let mut types = ContentTypes::parse(&utf8(CONTENT_TYPES_PART, package.require(CONTENT_TYPES_PART)?)?)?;
        if !types.has_default("png") {
            types.add_default("png", "image/png");
            package.set_part(CONTENT_TYPES_PART, types.to_xml().into_bytes());
        }
    }

    package.to_bytes()
}
