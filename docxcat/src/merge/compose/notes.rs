//! Importing footnotes and endnotes.

use std::collections::HashMap;

use crate::error::Result;
use crate::io::Package;
use crate::io::relationships::{Relationships, relative_target, resolve_target};
use crate::io::xml;
use crate::merge::compose::body::{ContentRewriter, Remap};
use crate::merge::compose::parts::{
    Linker, PartCopier, insert_at, merge_root_namespaces, relationship_prefixes, root_layout,
};

/// Which notes part to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// `word/footnotes.xml`
    Footnotes,
    /// `word/endnotes.xml`
    Endnotes,
}

impl NoteKind {
    fn relationship(self) -> &'static str {
        match self {
            NoteKind::Footnotes => "footnotes",
            NoteKind::Endnotes => "endnotes",
        }
    }

    fn element(self) -> &'static [u8] {
        match self {
            NoteKind::Footnotes => b"footnote",
            NoteKind::Endnotes => b"endnote",
        }
    }
}

/// Import the notes of `source` into `base`.
///
/// Only regular notes are copied; the base keeps its own separators. Each
/// copied note gets the next free id after the base's highest one, and the
/// returned map translates the references in the copied body.
#[allow(clippy::too_many_arguments)]
pub fn import_notes(
    kind: NoteKind,
    source: &Package,
    source_main: &str,
    base: &mut Package,
    base_main: &str,
    base_rels: &mut Relationships,
    copier: &mut PartCopier,
    remap: &Remap,
) -> Result<HashMap<String, String>> {
    let source_rels = source.relationships(source_main)?;
    let Some(source_rel) = source_rels.find_kind(kind.relationship()) else {
        return Ok(HashMap::new());
    };
    let source_part = resolve_target(source_main, &source_rel.target);
    let Some(source_xml) = source.part(&source_part) else {
        return Ok(HashMap::new());
    };

    let base_part = base_rels
        .find_kind(kind.relationship())
        .map(|rel| resolve_target(base_main, &rel.target))
        .filter(|part| base.contains(part));

    let Some(base_part) = base_part else {
        let copied = copier.copy(source, base, &source_part)?;
        base_rels.add(&source_rel.rel_type, &relative_target(base_main, &copied), false);
        return Ok(HashMap::new());
    };

    let base_xml = base.part(&base_part).unwrap_or_default().to_vec();
    let base_layout = root_layout(&base_xml)?;
    let Some(close) = base_layout.close_start else {
        base.set_part(&base_part, source_xml.to_vec());
        return Ok(HashMap::new());
    };

    let mut next_id: i64 = 1;
    for note in base_layout.children_named(kind.element()) {
        if let Some(id) = xml::attr(&note.element, b"id")?.and_then(|v| v.parse::<i64>().ok()) {
            next_id = next_id.max(id + 1);
        }
    }

    let source_layout = root_layout(source_xml)?;
    let mut ids = HashMap::new();
    let mut notes = Vec::new();
    for note in source_layout.children_named(kind.element()) {
        let note_type = xml::attr(&note.element, b"type")?;
        if note_type.is_some_and(|t| t != "normal") {
            continue;
        }
        let Some(id) = xml::attr(&note.element, b"id")? else {
            continue;
        };
        ids.insert(id, next_id.to_string());
        next_id += 1;
        notes.push(note.range.clone());
    }
    if notes.is_empty() {
        return Ok(ids);
    }

    let local = match kind {
        NoteKind::Footnotes => Remap {
            footnotes: ids.clone(),
            ..remap.clone()
        },
        NoteKind::Endnotes => Remap {
            endnotes: ids.clone(),
            ..remap.clone()
        },
    };

    let mut linker = Linker::new(source, &source_part, base, &base_part)?;
    let prefixes = relationship_prefixes(&source_layout.root)?;
    let mut copied = Vec::new();
    {
        let mut rewriter = ContentRewriter::new(source, base, copier, &mut linker, &local, prefixes);
        for range in &notes {
            copied.extend_from_slice(&rewriter.rewrite_fragment(&source_xml[range.clone()])?);
        }
    }

    let merged = insert_at(&base_xml, close, &copied);
    base.set_part(&base_part, merge_root_namespaces(&merged, source_xml)?);
    linker.finish(base)?;

    tracing::debug!(kind = kind.relationship(), notes = ids.len(), "imported notes");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::relationships::RT_PREFIX;

    const PART: &str = "word/footnotes.xml";

    fn package_with_footnotes(footnotes: Option<&str>) -> (Package, Relationships) {
        let mut package = Package::new();
        let mut rels = Relationships::new();
        if let Some(footnotes) = footnotes {
            rels.add(&format!("{RT_PREFIX}footnotes"), "footnotes.xml", false);
            package.set_part(PART, footnotes.as_bytes().to_vec());
        }
        package.set_relationships("word/document.xml", &rels).unwrap();
        (package, rels)
    }

    fn source() -> Package {
        let (mut package, _) = package_with_footnotes(Some(
            r#"<w:footnotes xmlns:w="W" xmlns:r="R"><w:footnote w:type="separator" w:id="-1"><w:p/></w:footnote><w:footnote w:id="1"><w:p><w:hyperlink r:id="rId1"><w:r><w:t>see</w:t></w:r></w:hyperlink></w:p></w:footnote></w:footnotes>"#,
        ));
        let mut rels = Relationships::new();
        rels.add(&format!("{RT_PREFIX}hyperlink"), "https://example.com", true);
        package.set_relationships(PART, &rels).unwrap();
        package
    }

    fn import(base: &mut Package, base_rels: &mut Relationships) -> HashMap<String, String> {
        let mut copier = PartCopier::new();
        import_notes(
            NoteKind::Footnotes,
            &source(),
            "word/document.xml",
            base,
            "word/document.xml",
            base_rels,
            &mut copier,
            &Remap::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_regular_notes_are_appended_with_new_ids() {
        let (mut base, mut base_rels) = package_with_footnotes(Some(
            r#"<w:footnotes xmlns:w="W"><w:footnote w:type="separator" w:id="-1"><w:p/></w:footnote><w:footnote w:type="continuationSeparator" w:id="0"><w:p/></w:footnote><w:footnote w:id="1"><w:p/></w:footnote></w:footnotes>"#,
        ));

        let ids = import(&mut base, &mut base_rels);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get("1").map(String::as_str), Some("2"));

        let xml = String::from_utf8(base.part(PART).unwrap().to_vec()).unwrap();
        assert_eq!(xml.matches(r#"w:type="separator""#).count(), 1);
        assert!(xml.contains(r#"<w:footnote w:id="2"><w:p><w:hyperlink r:id="rId1">"#));
        assert!(xml.contains(r#"xmlns:r="R""#));

        let rels = base.relationships(PART).unwrap();
        assert_eq!(rels.get("rId1").unwrap().target, "https://example.com");
    }

    #[test]
    fn test_notes_part_is_copied_when_base_has_none() {
        let (mut base, mut base_rels) = package_with_footnotes(None);

        let ids = import(&mut base, &mut base_rels);

        assert!(ids.is_empty());
        assert!(base.contains(PART));
        assert_eq!(base_rels.find_kind("footnotes").unwrap().target, "footnotes.xml");
        assert!(base.relationships(PART).unwrap().get("rId1").is_some());
    }
}
