//! Package relationships (`*.rels` parts).
//!
//! Every part that links to other parts or to external resources has a
//! sibling relationships part: `word/document.xml` is described by
//! `word/_rels/document.xml.rels`, the package itself by `_rels/.rels`.

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::Result;
use crate::io::xml;

/// Namespace of relationships parts.
pub const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type prefix for transitional documents.
pub const RT_PREFIX: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";

/// One relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Id referenced from the source part (`rId3`).
    pub id: String,
    /// Full relationship type URI.
    pub rel_type: String,
    /// Target, relative to the source part's directory unless absolute.
    pub target: String,
    /// True for `TargetMode="External"` (hyperlinks, linked images).
    pub external: bool,
}

impl Relationship {
    /// Last segment of the type URI, e.g. `image` or `officeDocument`.
    ///
    /// Matching on the segment covers both transitional and strict type URIs.
    pub fn kind(&self) -> &str {
        self.rel_type
            .rsplit('/')
            .next()
            .unwrap_or(self.rel_type.as_str())
    }
}

/// Ordered relationships of one source part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = xml::reader(bytes);
        let mut buf = Vec::new();
        let mut entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    let id = xml::attr(&e, b"Id")?.unwrap_or_default();
                    let rel_type = xml::attr(&e, b"Type")?.unwrap_or_default();
                    let target = xml::attr(&e, b"Target")?.unwrap_or_default();
                    let external = xml::attr(&e, b"TargetMode")?.as_deref() == Some("External");
                    entries.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Serialise to a `.rels` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = xml::writer()?;
        let mut root = BytesStart::new("Relationships");
        root.push_attribute(("xmlns", NS_PACKAGE_RELS));
        writer.write_event(Event::Start(root))?;

        for rel in &self.entries {
            let mut element = BytesStart::new("Relationship");
            element.push_attribute(("Id", rel.id.as_str()));
            element.push_attribute(("Type", rel.rel_type.as_str()));
            element.push_attribute(("Target", rel.target.as_str()));
            if rel.external {
                element.push_attribute(("TargetMode", "External"));
            }
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(writer.into_inner())
    }

    /// Look up a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    /// First relationship of the given kind (see [`Relationship::kind`]).
    pub fn find_kind(&self, kind: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.kind() == kind)
    }

    /// Iterate all relationships.
    pub fn iter(&self) -> std::slice::Iter<'_, Relationship> {
        self.entries.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a relationship keeping its id.
    pub fn push(&mut self, rel: Relationship) {
        self.entries.push(rel);
    }

    /// Add a relationship under a fresh `rIdN` id and return that id.
    pub fn add(&mut self, rel_type: &str, target: &str, external: bool) -> String {
        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
        id
    }

    fn next_id(&self) -> String {
        let highest = self
            .entries
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", highest + 1)
    }
}

/// Name of the relationships part describing `part`.
///
/// The package-level relationships belong to the empty part name.
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Directory of a part name (`word/media/a.png` gives `word/media`).
pub fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve an internal relationship target against its source part.
///
/// Returns the part name inside the package, without a leading slash.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = part_dir(source_part);
            if dir.is_empty() {
                target.to_string()
            } else {
                format!("{dir}/{target}")
            }
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Target string for linking `source_part` to `target_part`.
///
/// Parts below the source's directory get a relative target; anything else
/// is addressed absolutely.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let dir = part_dir(source_part);
    if dir.is_empty() {
        return target_part.to_string();
    }
    match target_part.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(relative) => relative.to_string(),
        None => format!("/{target_part}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::parse(DOCUMENT_RELS.as_bytes()).unwrap();
        assert_eq!(rels.len(), 3);

        let image = rels.get("rId7").unwrap();
        assert_eq!(image.kind(), "image");
        assert_eq!(image.target, "media/image1.png");
        assert!(!image.external);

        let link = rels.get("rId8").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");

        assert_eq!(rels.find_kind("styles").unwrap().id, "rId1");
    }

    #[test]
    fn test_add_uses_next_free_id() {
        let mut rels = Relationships::parse(DOCUMENT_RELS.as_bytes()).unwrap();
        let id = rels.add(&format!("{RT_PREFIX}image"), "media/image2.png", false);
        assert_eq!(id, "rId9");
        assert_eq!(rels.add(&format!("{RT_PREFIX}footer"), "footer1.xml", false), "rId10");
    }

    #[test]
    fn test_serialised_relationships_parse_back() {
        let rels = Relationships::parse(DOCUMENT_RELS.as_bytes()).unwrap();
        let xml = rels.to_xml().unwrap();
        assert_eq!(Relationships::parse(&xml).unwrap(), rels);
    }

    #[rstest]
    #[case("word/document.xml", "word/_rels/document.xml.rels")]
    #[case("word/header1.xml", "word/_rels/header1.xml.rels")]
    #[case("", "_rels/.rels")]
    fn test_rels_part_name(#[case] part: &str, #[case] expected: &str) {
        assert_eq!(rels_part_name(part), expected);
    }

    #[rstest]
    #[case("word/document.xml", "media/image1.png", "word/media/image1.png")]
    #[case("word/document.xml", "/word/styles.xml", "word/styles.xml")]
    #[case("word/glossary/document.xml", "../media/a.png", "word/media/a.png")]
    #[case("", "word/document.xml", "word/document.xml")]
    #[case("word/document.xml", "./theme/theme1.xml", "word/theme/theme1.xml")]
    fn test_resolve_target(#[case] source: &str, #[case] target: &str, #[case] expected: &str) {
        assert_eq!(resolve_target(source, target), expected);
    }

    #[rstest]
    #[case("word/document.xml", "word/media/image3.png", "media/image3.png")]
    #[case("word/document.xml", "customXml/item1.xml", "/customXml/item1.xml")]
    #[case("", "word/document.xml", "word/document.xml")]
    fn test_relative_target(#[case] source: &str, #[case] part: &str, #[case] expected: &str) {
        assert_eq!(relative_target(source, part), expected);
    }
}
