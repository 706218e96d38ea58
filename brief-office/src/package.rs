//! In-memory OPC package: an ordered set of named parts plus the
//! relationship and content-type bookkeeping around them.

use crate::xml::{attribute, escape_xml, xml_error};
use brief_core::{BriefError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_XML: &str = "application/xml";
/// Most bytes reserved up front for one entry; larger parts grow as read.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Parts of an OOXML package, kept in archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every entry of a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| BriefError::Template(format!("not an Office package: {e}")))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| BriefError::Template(format!("unreadable package entry: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(initial_capacity(entry.size()));
            entry.read_to_end(&mut data)?;
            parts.push((entry.name().to_string(), data));
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.iter().find(|(n, _)| n == name).map(|(_, data)| data.as_slice())
    }

    /// Part contents, or a `BriefError::Template` naming the missing part.
    pub fn require(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| BriefError::Template(format!("package has no '{name}' part")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replaces a part in place or appends a new one.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name, data)),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Writes the package as a deflated ZIP, content types first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|(n, _)| n == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|(n, _)| n != CONTENT_TYPES_PART));

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| xml_error("failed to start package entry", e))?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish().map_err(|e| xml_error("failed to finish package", e))?;
        Ok(cursor.into_inner())
    }
}

/// Location of the relationships part that belongs to `part`.
///
/// `word/document.xml` maps to `word/_rels/document.xml.rels`; the empty
/// string (the package itself) maps to `_rels/.rels`.
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target against the part that owns it.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// A relationships part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut entries = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    entries.push(Relationship {
                        id: attribute(&e, b"Id").unwrap_or_default(),
                        rel_type: attribute(&e, b"Type").unwrap_or_default(),
                        target: attribute(&e, b"Target").unwrap_or_default(),
                        external: attribute(&e, b"TargetMode").as_deref() == Some("External"),
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(BriefError::Template(format!("malformed relationships: {e}"))),
                _ => {}
            }
        }
        Ok(Self { entries })
    }

    /// Adds an internal relationship and returns its new `rIdN`.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .entries
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), CT_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), CT_XML.to_string());
        Self { defaults, overrides: BTreeMap::new() }
    }
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut types = Self { defaults: BTreeMap::new(), overrides: BTreeMap::new() };
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attribute(&e, b"Extension"), attribute(&e, b"ContentType"))
                        {
                            types.defaults.insert(ext.to_ascii_lowercase(), ct);
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (attribute(&e, b"PartName"), attribute(&e, b"ContentType"))
                        {
                            types.overrides.insert(part, ct);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(BriefError::Template(format!("malformed content types: {e}"))),
                _ => {}
            }
        }
        Ok(types)
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_ascii_lowercase())
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    /// `part` is a package path without the leading slash.
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        self.overrides.insert(format!("/{}", part.trim_start_matches('/')), content_type.to_string());
    }

    pub fn override_for(&self, part: &str) -> Option<&str> {
        self.overrides.get(&format!("/{}", part.trim_start_matches('/'))).map(String::as_str)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Buffer size for an entry whose header declares `declared` bytes.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared).unwrap_or(usize::MAX).min(MAX_PREALLOCATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Overwrites the uncompressed size of every entry in both the local and
    /// central directory headers.
    fn forge_declared_size(bytes: &mut [u8], size: u32) {
        let size = size.to_le_bytes();
        for i in 0..bytes.len().saturating_sub(30) {
            let signature = [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
            match signature {
                [0x50, 0x4b, 0x03, 0x04] => bytes[i + 22..i + 26].copy_from_slice(&size),
                [0x50, 0x4b, 0x01, 0x02] => bytes[i + 24..i + 28].copy_from_slice(&size),
                _ => {}
            }
        }
    }

    #[test]
    fn declared_entry_size_does_not_drive_allocation() {
        assert_eq!(initial_capacity(512), 512);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOCATION);
        assert_eq!(initial_capacity(0x7fff_ffff), MAX_PREALLOCATION);

        let mut package = Package::new();
        package.set_part("a.xml", b"<a/>".to_vec());
        let mut bytes = package.to_bytes().unwrap();
        forge_declared_size(&mut bytes, 0x7fff_ffff);

        match Package::from_bytes(&bytes) {
            Ok(read) => assert_eq!(read.part("a.xml"), Some(&b"<a/>"[..])),
            Err(e) => assert!(matches!(e, BriefError::Template(_) | BriefError::Io(_)), "{e}"),
        }
    }

    #[test]
    fn rels_paths() {
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("ppt/slides/slide3.xml"), "ppt/slides/_rels/slide3.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
    }

    #[test]
    fn targets_resolve_relative_to_source() {
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "../media/image1.png"), "ppt/media/image1.png");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "/ppt/media/a.png"), "ppt/media/a.png");
    }

    #[test]
    fn relationships_allocate_fresh_ids() {
        let mut rels = Relationships::parse(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
                 <Relationship Id="rId2" Type="t/layout" Target="../slideLayouts/slideLayout2.xml"/>
                 <Relationship Id="rId7" Type="t/link" Target="https://example.com" TargetMode="External"/>
               </Relationships>"#,
        )
        .unwrap();

        assert!(rels.get("rId7").unwrap().external);
        assert_eq!(rels.add("t/image", "../media/brief1.png"), "rId8");
        let xml = rels.to_xml();
        assert!(xml.contains(r#"Id="rId8""#));
        assert!(xml.contains(r#"TargetMode="External""#));
        assert_eq!(Relationships::parse(&xml).unwrap(), rels);
    }

    #[test]
    fn content_types_round_trip() {
        let mut types = ContentTypes::default();
        types.add_override("word/document.xml", "application/main+xml");
        types.add_default("PNG", "image/png");

        let parsed = ContentTypes::parse(&types.to_xml()).unwrap();
        assert!(parsed.has_default("png"));
        assert_eq!(parsed.override_for("/word/document.xml"), Some("application/main+xml"));
        assert_eq!(parsed, types);
    }

    #[test]
    fn package_round_trip_keeps_content_types_first() {
        let mut package = Package::new();
        package.set_part("word/document.xml", b"<doc/>".to_vec());
        package.set_part(CONTENT_TYPES_PART, ContentTypes::default().to_xml().into_bytes());
        package.set_part("word/document.xml", b"<doc>2</doc>".to_vec());

        let bytes = package.to_bytes().unwrap();
        let reread = Package::from_bytes(&bytes).unwrap();
        let names: Vec<&str> = reread.part_names().collect();
        assert_eq!(names, [CONTENT_TYPES_PART, "word/document.xml"]);
        assert_eq!(reread.part("word/document.xml"), Some(&b"<doc>2</doc>"[..]));
    }

    #[test]
    fn garbage_is_a_template_error() {
        assert!(matches!(Package::from_bytes(b"not a zip"), Err(BriefError::Template(_))));
    }
}
