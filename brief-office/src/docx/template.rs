//! `{{key}}` substitution in an existing Word document.

use crate::fields::TemplateFields;
use crate::package::Package;
use crate::xml::{escape_xml, resolve_reference, utf8, xml_error};
use brief_core::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeSet;
use std::ops::Range;

const DOCUMENT_PART: &str = "word/document.xml";

/// Fills the `{{key}}` placeholders of `word/document.xml` and returns the new
/// package. Every other part is copied unchanged.
pub fn populate_docx(template: &[u8], fields: &TemplateFields) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(template)?;
    let xml = utf8(DOCUMENT_PART, package.require(DOCUMENT_PART)?)?;

    let mut unknown = BTreeSet::new();
    let populated = populate_document_xml(&xml, fields, &mut unknown)?;
    for key in &unknown {
        brief_telemetry::warn!(key = %key, "template placeholder has no value; left as is");
    }

    package.set_part(DOCUMENT_PART, populated.into_bytes());
    package.to_bytes()
}

fn populate_document_xml(
    xml: &str,
    fields: &TemplateFields,
    unknown: &mut BTreeSet<String>,
) -> Result<String> {
    let mut out = String::with_capacity(xml.len());
    let mut copied_to = 0;
    let mut replaced = 0usize;

    for span in paragraph_spans(xml)? {
        let paragraph = &xml[span.clone()];
        if let Some(rewritten) = rewrite_paragraph(paragraph, fields, unknown)? {
            out.push_str(&xml[copied_to..span.start]);
            out.push_str(&rewritten);
            copied_to = span.end;
            replaced += 1;
        }
    }
    out.push_str(&xml[copied_to..]);

    brief_telemetry::debug!(paragraphs = replaced, "populated document placeholders");
    Ok(out)
}

/// Byte ranges of every `w:p` that has no nested paragraph, in document order.
fn paragraph_spans(xml: &str) -> Result<Vec<Range<usize>>> {
    let mut reader = Reader::from_str(xml);
    // (start offset, contains a nested paragraph)
    let mut open: Vec<(usize, bool)> = Vec::new();
    let mut spans = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                if let Some(parent) = open.last_mut() {
                    parent.1 = true;
                }
                open.push((before, false));
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if let Some((start, false)) = open.pop() {
                    spans.push(start..reader.buffer_position() as usize);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("malformed word/document.xml", e)),
        }
    }

    spans.sort_by_key(|s| s.start);
    Ok(spans)
}

/// Positions of one `<w:t>` element inside a paragraph.
struct TextElement {
    tag: Range<usize>,
    content: Range<usize>,
}

#[derive(Default)]
struct ParagraphScan {
    text: String,
    texts: Vec<TextElement>,
    paragraph_properties: Option<Range<usize>>,
    first_run_properties: Option<Range<usize>>,
}

fn scan_paragraph(xml: &str) -> Result<ParagraphScan> {
    let mut reader = Reader::from_str(xml);
    let mut scan = ParagraphScan::default();
    let mut in_run = false;
    let mut text_tag: Option<Range<usize>> = None;
    let mut ppr_start = None;
    let mut rpr_start = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| xml_error("malformed paragraph", e))?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" if in_run => text_tag = Some(before..after),
                b"w:pPr" if !in_run => ppr_start = Some(before),
                b"w:rPr" if in_run && scan.first_run_properties.is_none() => rpr_start = Some(before),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:pPr" if !in_run => scan.paragraph_properties = Some(before..after),
                b"w:rPr" if in_run && scan.first_run_properties.is_none() => {
                    scan.first_run_properties = Some(before..after);
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => {
                    if let Some(tag) = text_tag.take() {
                        scan.texts.push(TextElement { content: tag.end..before, tag });
                    }
                }
                b"w:pPr" => {
                    if let Some(start) = ppr_start.take() {
                        scan.paragraph_properties = Some(start..after);
                    }
                }
                b"w:rPr" => {
                    if let Some(start) = rpr_start.take() {
                        scan.first_run_properties = Some(start..after);
                    }
                }
                _ => {}
            },
            Event::Text(t) if text_tag.is_some() => {
                scan.text.push_str(
                    std::str::from_utf8(t.as_ref()).map_err(|e| xml_error("paragraph text", e))?,
                );
            }
            Event::GeneralRef(r) if text_tag.is_some() => {
                if let Some(resolved) = resolve_reference(&r) {
                    scan.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(scan)
}

/// The replacement for one paragraph, or `None` when it has nothing to fill.
fn rewrite_paragraph(
    paragraph: &str,
    fields: &TemplateFields,
    unknown: &mut BTreeSet<String>,
) -> Result<Option<String>> {
    if !paragraph.contains("{{") {
        return Ok(None);
    }
    let scan = scan_paragraph(paragraph)?;
    if scan.texts.is_empty() {
        return Ok(None);
    }

    if let Some(value) = TemplateFields::sole_placeholder(&scan.text).and_then(|key| fields.get(key)) {
        return Ok(Some(expand_block(paragraph, &scan, value)));
    }

    let (text, missing) = fields.substitute(&scan.text);
    unknown.extend(missing);
    if text == scan.text {
        return Ok(None);
    }
    Ok(Some(consolidate_runs(paragraph, &scan, &text)))
}

/// One paragraph per non-blank line of `value`, styled like the placeholder.
fn expand_block(paragraph: &str, scan: &ParagraphScan, value: &str) -> String {
    let ppr = scan.paragraph_properties.clone().map(|r| &paragraph[r]).unwrap_or_default();
    let rpr = scan.first_run_properties.clone().map(|r| &paragraph[r]).unwrap_or_default();

    let lines: Vec<&str> = value.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return format!("<w:p>{ppr}</w:p>");
    }
    // A section break in the placeholder's properties ends the section after
    // the last line only.
    let leading_ppr = without_section_break(ppr);
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let ppr = if i == last { ppr } else { leading_ppr.as_str() };
            format!(
                r#"<w:p>{ppr}<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(line)
            )
        })
        .collect()
}

/// `ppr` with its `w:sectPr` element removed.
fn without_section_break(ppr: &str) -> String {
    let Some(start) = ppr
        .match_indices("<w:sectPr")
        .map(|(i, _)| i)
        .find(|&i| matches!(ppr.as_bytes().get(i + "<w:sectPr".len()), Some(b' ' | b'>' | b'/')))
    else {
        return ppr.to_string();
    };
    let rest = &ppr[start..];
    let tag_end = rest.find('>').map_or(rest.len(), |i| i + 1);
    let end = if rest[..tag_end].ends_with("/>") {
        tag_end
    } else {
        rest.find("</w:sectPr>").map_or(rest.len(), |i| i + "</w:sectPr>".len())
    };
    format!("{}{}", &ppr[..start], &rest[end..])
}

/// Puts `text` into the first `w:t` and empties the others, so a placeholder
/// split across runs is replaced as a whole.
fn consolidate_runs(paragraph: &str, scan: &ParagraphScan, text: &str) -> String {
    let mut out = String::with_capacity(paragraph.len() + text.len());
    let mut copied_to = 0;
    for (i, element) in scan.texts.iter().enumerate() {
        if i == 0 {
            out.push_str(&paragraph[copied_to..element.tag.start]);
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&escape_xml(text));
        } else {
            out.push_str(&paragraph[copied_to..element.content.start]);
        }
        copied_to = element.content.end;
    }
    out.push_str(&paragraph[copied_to..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(xml: &str, fields: &TemplateFields) -> (String, BTreeSet<String>) {
        let mut unknown = BTreeSet::new();
        let out = populate_document_xml(xml, fields, &mut unknown).unwrap();
        (out, unknown)
    }

    #[test]
    fn sole_placeholder_becomes_one_paragraph_per_line() {
        let xml = r#"<w:body><w:p><w:pPr><w:pStyle w:val="Body"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>{{summary}}</w:t></w:r></w:p></w:body>"#;
        let fields = TemplateFields::new().with("summary", "Costs rose.\n\nMargins fell.");
        let (out, unknown) = populate(xml, &fields);

        assert!(unknown.is_empty());
        assert_eq!(
            out,
            concat!(
                r#"<w:body>"#,
                r#"<w:p><w:pPr><w:pStyle w:val="Body"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Costs rose.</w:t></w:r></w:p>"#,
                r#"<w:p><w:pPr><w:pStyle w:val="Body"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Margins fell.</w:t></w:r></w:p>"#,
                r#"</w:body>"#
            )
        );
    }

    #[test]
    fn section_break_stays_on_the_last_expanded_line() {
        let xml = concat!(
            r#"<w:body><w:p><w:pPr><w:pStyle w:val="Body"/><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:pPr>"#,
            r#"<w:r><w:t>{{plan}}</w:t></w:r></w:p></w:body>"#
        );
        let fields = TemplateFields::new().with("plan", "Phase 1\nPhase 2\nPhase 3");
        let (out, _) = populate(xml, &fields);

        assert_eq!(out.matches("<w:p>").count(), 3);
        assert_eq!(out.matches("<w:sectPr>").count(), 1);
        assert_eq!(out.matches(r#"<w:pStyle w:val="Body"/>"#).count(), 3);
        let last = out.rfind("<w:p>").unwrap();
        assert!(out[last..].contains("<w:sectPr>"));
        assert!(out[last..].contains("Phase 3"));
    }

    #[test]
    fn section_break_removal_handles_empty_elements() {
        assert_eq!(
            without_section_break(r#"<w:pPr><w:sectPr w:rsidR="1"/><w:jc w:val="left"/></w:pPr>"#),
            r#"<w:pPr><w:jc w:val="left"/></w:pPr>"#
        );
        assert_eq!(without_section_break("<w:pPr><w:sectPrChange/></w:pPr>"), "<w:pPr><w:sectPrChange/></w:pPr>");
    }

    #[test]
    fn placeholder_split_across_runs_is_consolidated() {
        let xml = r#"<w:p><w:r><w:t>Prepared for {{comp</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>any}} &amp; partners</w:t></w:r></w:p>"#;
        let fields = TemplateFields::new().with("company", "AT&T");
        let (out, _) = populate(xml, &fields);
        assert_eq!(
            out,
            r#"<w:p><w:r><w:t xml:space="preserve">Prepared for AT&amp;T &amp; partners</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t></w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn unknown_keys_are_reported_and_left_in_place() {
        let xml = r#"<w:p><w:r><w:t>{{quarter}} review</w:t></w:r></w:p>"#;
        let (out, unknown) = populate(xml, &TemplateFields::new());
        assert_eq!(out, xml);
        assert!(unknown.contains("quarter"));
    }

    #[test]
    fn paragraphs_without_placeholders_are_untouched() {
        let xml = r#"<w:body><w:p w:rsidR="00AB"><w:r><w:t xml:space="preserve">Plain </w:t></w:r></w:p><w:p/></w:body>"#;
        let (out, _) = populate(xml, &TemplateFields::new().with("title", "x"));
        assert_eq!(out, xml);
    }

    #[test]
    fn only_innermost_paragraphs_are_rewritten() {
        let xml = r#"<w:p><w:r><w:t>outer</w:t><w:pict><w:txbxContent><w:p><w:r><w:t>{{title}}</w:t></w:r></w:p></w:txbxContent></w:pict></w:r></w:p>"#;
        let (out, _) = populate(xml, &TemplateFields::new().with("title", "Margin Rescue"));
        assert!(out.contains(r#"<w:t xml:space="preserve">Margin Rescue</w:t>"#));
        assert!(out.contains("<w:t>outer</w:t>"));
    }
}
