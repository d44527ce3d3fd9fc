//! Locating and rewriting document body content.

use std::collections::HashMap;
use std::ops::Range;

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DocxCatError, Result};
use crate::io::Package;
use crate::io::xml;
use crate::merge::compose::parts::{Linker, PartCopier, offset_id};

/// Elements removed from copied content, with their children.
const DROPPED: [&[u8]; 3] = [b"commentRangeStart", b"commentRangeEnd", b"commentReference"];

/// Byte layout of a main document part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLayout {
    /// Offset just after the `w:body` start tag.
    pub content_start: usize,
    /// Range of the body-level `w:sectPr`, if present.
    pub sect_pr: Option<Range<usize>>,
    /// Offset of the `w:body` end tag.
    pub body_end: usize,
}

impl BodyLayout {
    /// Range of the body content without the final section properties.
    pub fn content(&self) -> Range<usize> {
        let end = self.sect_pr.as_ref().map_or(self.body_end, |range| range.start);
        self.content_start..end
    }
}

/// Locate the body of a main document part.
pub fn body_layout(bytes: &[u8]) -> Result<BodyLayout> {
    let mut reader = xml::reader(bytes);
    let mut depth = 0usize;
    let mut body_depth = None;
    let mut content_start = 0;
    let mut sect_start = None;
    let mut sect_pr = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => {
                let name = e.local_name();
                if body_depth.is_none() && name.as_ref() == b"body" {
                    body_depth = Some(depth);
                    content_start = after;
                } else if body_depth.is_some_and(|d| depth == d + 1) && name.as_ref() == b"sectPr" {
                    sect_start = Some(before);
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if body_depth.is_none() && name.as_ref() == b"body" {
                    return Ok(BodyLayout {
                        content_start: after,
                        sect_pr: None,
                        body_end: after,
                    });
                }
                if body_depth.is_some_and(|d| depth == d + 1) && name.as_ref() == b"sectPr" {
                    sect_pr = Some(before..after);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if let Some(d) = body_depth {
                    if depth == d + 1
                        && let Some(start) = sect_start.take()
                    {
                        sect_pr = Some(start..after);
                    } else if depth == d {
                        return Ok(BodyLayout {
                            content_start,
                            sect_pr,
                            body_end: before,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(DocxCatError::other("main document part has no w:body element"))
}

/// Id translations applied to copied content.
#[derive(Debug, Clone, Default)]
pub struct Remap {
    /// Added to every bookmark id.
    pub bookmark_offset: u64,
    /// Added to every drawing (`wp:docPr`) id.
    pub drawing_offset: u64,
    /// Footnote ids, old to new.
    pub footnotes: HashMap<String, String>,
    /// Endnote ids, old to new.
    pub endnotes: HashMap<String, String>,
    /// Numbering instance ids (`w:numId`), old to new.
    pub numbering: HashMap<String, String>,
}

/// Rewrites copied elements so they are valid inside the base package.
///
/// Relationship ids are imported through the [`Linker`], numeric ids are
/// translated with the [`Remap`], and comment anchors are dropped.
pub struct ContentRewriter<'a> {
    source: &'a Package,
    base: &'a mut Package,
    copier: &'a mut PartCopier,
    linker: &'a mut Linker,
    remap: &'a Remap,
    r_prefixes: Vec<Vec<u8>>,
    skip_depth: usize,
    dropped: usize,
}

impl<'a> ContentRewriter<'a> {
    /// Create a rewriter for content moving from `source` into `base`.
    ///
    /// `r_prefixes` are the prefixes bound to the relationships namespace on
    /// the source root; `r` is assumed when none are given.
    pub fn new(
        source: &'a Package,
        base: &'a mut Package,
        copier: &'a mut PartCopier,
        linker: &'a mut Linker,
        remap: &'a Remap,
        r_prefixes: Vec<Vec<u8>>,
    ) -> Self {
        let r_prefixes = if r_prefixes.is_empty() {
            vec![b"r".to_vec()]
        } else {
            r_prefixes
        };
        Self {
            source,
            base,
            copier,
            linker,
            remap,
            r_prefixes,
            skip_depth: 0,
            dropped: 0,
        }
    }

    /// Number of elements dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Rewrite every event of the well-balanced fragment `bytes`.
    pub fn rewrite_fragment(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut reader = xml::reader(bytes);
        let mut writer = Writer::new(Vec::with_capacity(bytes.len()));
        loop {
            match reader.read_event()? {
                Event::Eof => break,
                event => self.write_event(&mut writer, event)?,
            }
        }
        Ok(writer.into_inner())
    }

    /// Write one event, rewritten, unless it belongs to dropped content.
    pub fn write_event(&mut self, writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return Ok(());
        }

        match event {
            Event::Start(e) => match self.rewrite(&e)? {
                Some(element) => writer.write_event(Event::Start(element))?,
                None => self.skip_depth = 1,
            },
            Event::Empty(e) => {
                if let Some(element) = self.rewrite(&e)? {
                    writer.write_event(Event::Empty(element))?;
                }
            }
            other => writer.write_event(other)?,
        }
        Ok(())
    }

    /// Rewritten copy of `element`, or `None` when it is dropped.
    fn rewrite(&mut self, element: &BytesStart<'_>) -> Result<Option<BytesStart<'static>>> {
        let local = element.local_name().as_ref().to_vec();
        if DROPPED.contains(&local.as_slice()) {
            self.dropped += 1;
            return Ok(None);
        }

        let mut ids = Vec::new();
        for attribute in element.attributes() {
            let attribute = attribute?;
            let key = attribute.key.as_ref();
            if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                let value = attribute.unescape_value()?;
                if (value == xml::NS_R || value == super::parts::NS_R_STRICT)
                    && !self.r_prefixes.iter().any(|p| p == prefix)
                {
                    self.r_prefixes.push(prefix.to_vec());
                }
            } else if is_relationship_attr(&self.r_prefixes, key) {
                ids.push(attribute.unescape_value()?.into_owned());
            }
        }
        for id in &ids {
            self.linker
                .import(id, self.copier, self.source, self.base)?;
        }

        let linker = &*self.linker;
        let remap = self.remap;
        let r_prefixes = &self.r_prefixes;
        let rewritten = xml::rewrite_attributes(element, |key, value| {
            if is_relationship_attr(r_prefixes, key) {
                return linker.get(value).map(str::to_string);
            }
            let attr_local = key.rsplit(|b| *b == b':').next().unwrap_or(key);
            match (local.as_slice(), attr_local) {
                (b"bookmarkStart" | b"bookmarkEnd", b"id") => {
                    offset_id(value, remap.bookmark_offset)
                }
                (b"docPr", b"id") => offset_id(value, remap.drawing_offset),
                (b"footnoteReference", b"id") => remap.footnotes.get(value).cloned(),
                (b"endnoteReference", b"id") => remap.endnotes.get(value).cloned(),
                (b"footnote", b"id") => remap.footnotes.get(value).cloned(),
                (b"endnote", b"id") => remap.endnotes.get(value).cloned(),
                (b"numId", b"val") => remap.numbering.get(value).cloned(),
                _ => None,
            }
        })?;

        Ok(Some(rewritten))
    }
}

fn is_relationship_attr(prefixes: &[Vec<u8>], key: &[u8]) -> bool {
    match key.iter().position(|b| *b == b':') {
        Some(colon) => prefixes.iter().any(|p| p.as_slice() == &key[..colon]),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::relationships::{RT_PREFIX, Relationships};

    const DOCUMENT: &str = r#"<w:document xmlns:w="W"><w:body><w:p/><w:tbl/><w:sectPr><w:pgSz/></w:sectPr></w:body></w:document>"#;

    #[test]
    fn test_body_layout() {
        let layout = body_layout(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(&DOCUMENT[layout.content()], "<w:p/><w:tbl/>");
        assert_eq!(
            &DOCUMENT[layout.sect_pr.clone().unwrap()],
            "<w:sectPr><w:pgSz/></w:sectPr>"
        );
        assert!(DOCUMENT[layout.body_end..].starts_with("</w:body>"));
    }

    #[test]
    fn test_body_layout_without_section_properties() {
        let xml = r#"<w:document xmlns:w="W"><w:body><w:p><w:pPr><w:sectPr/></w:pPr></w:p></w:body></w:document>"#;
        let layout = body_layout(xml.as_bytes()).unwrap();
        assert_eq!(layout.sect_pr, None);
        assert_eq!(&xml[layout.content()], "<w:p><w:pPr><w:sectPr/></w:pPr></w:p>");
    }

    #[test]
    fn test_body_layout_requires_body() {
        assert!(body_layout(br#"<w:document xmlns:w="W"/>"#).is_err());
    }

    #[test]
    fn test_rewriter_remaps_ids_and_drops_comments() {
        let mut source = Package::new();
        let mut rels = Relationships::new();
        rels.add(&format!("{RT_PREFIX}hyperlink"), "https://example.com", true);
        source.set_relationships("word/document.xml", &rels).unwrap();

        let mut base = Package::new();
        let mut base_rels = Relationships::new();
        base_rels.add(&format!("{RT_PREFIX}styles"), "styles.xml", false);
        base.set_relationships("word/document.xml", &base_rels).unwrap();

        let mut copier = PartCopier::new();
        let mut linker =
            Linker::new(&source, "word/document.xml", &base, "word/document.xml").unwrap();
        let remap = Remap {
            bookmark_offset: 10,
            footnotes: HashMap::from([("1".to_string(), "4".to_string())]),
            numbering: HashMap::from([("2".to_string(), "7".to_string())]),
            ..Default::default()
        };

        let fragment = br#"<w:p><w:pPr><w:numPr><w:numId w:val="2"/></w:numPr></w:pPr><w:bookmarkStart w:id="0" w:name="a"/><w:commentRangeStart w:id="0"/><w:hyperlink r:id="rId1"><w:r><w:t>x</w:t></w:r></w:hyperlink><w:r><w:footnoteReference w:id="1"/></w:r><w:commentRangeEnd w:id="0"/><w:r><w:commentReference w:id="0"/></w:r><w:bookmarkEnd w:id="0"/></w:p>"#;

        let mut rewriter = ContentRewriter::new(
            &source,
            &mut base,
            &mut copier,
            &mut linker,
            &remap,
            Vec::new(),
        );
        let output = String::from_utf8(rewriter.rewrite_fragment(fragment).unwrap()).unwrap();
        assert_eq!(rewriter.dropped(), 3);

        assert!(output.contains(r#"<w:numId w:val="7"/>"#));
        assert!(output.contains(r#"<w:bookmarkStart w:id="10" w:name="a"/>"#));
        assert!(output.contains(r#"<w:bookmarkEnd w:id="10"/>"#));
        assert!(output.contains(r#"<w:hyperlink r:id="rId2">"#));
        assert!(output.contains(r#"<w:footnoteReference w:id="4"/>"#));
        assert!(!output.contains("comment"));

        assert_eq!(linker.finish(&mut base).unwrap(), 1);
        let rels = base.relationships("word/document.xml").unwrap();
        assert!(rels.get("rId2").unwrap().external);
    }
}
