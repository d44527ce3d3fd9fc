//! Moving parts and relationships from a source package into the base.

use std::collections::HashMap;
use std::ops::Range;

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DocxCatError, Result};
use crate::io::Package;
use crate::io::relationships::{Relationships, relative_target, resolve_target};
use crate::io::xml;

/// Relationships namespace used by strict documents.
pub const NS_R_STRICT: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships";

/// Copies source parts into the base under collision-free names.
///
/// Each source part is copied at most once per source package; its own
/// relationships are re-created on the copy, following internal targets
/// recursively.
#[derive(Debug, Default)]
pub struct PartCopier {
    copied: HashMap<String, String>,
}

impl PartCopier {
    /// Create a copier with nothing copied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parts copied so far.
    pub fn copied(&self) -> usize {
        self.copied.len()
    }

    /// Copy `part` of `source` into `base` and return its name in `base`.
    pub fn copy(&mut self, source: &Package, base: &mut Package, part: &str) -> Result<String> {
        if let Some(done) = self.copied.get(part) {
            return Ok(done.clone());
        }

        let data = source
            .part(part)
            .ok_or_else(|| DocxCatError::other(format!("part '{part}' is missing")))?
            .to_vec();
        let name = base.unused_part_name(part);
        self.copied.insert(part.to_string(), name.clone());

        if let Some(content_type) = source.content_types().content_type_of(part)
            && base.content_types().content_type_of(&name) != Some(content_type)
        {
            let content_type = content_type.to_string();
            base.content_types_mut().set_override(&name, &content_type);
        }
        base.set_part(&name, data);

        let rels = source.relationships(part)?;
        if !rels.is_empty() {
            let mut copied_rels = Relationships::new();
            for rel in rels.iter() {
                let mut rel = rel.clone();
                if !rel.external {
                    let target = resolve_target(part, &rel.target);
                    if source.contains(&target) {
                        let new_target = self.copy(source, base, &target)?;
                        rel.target = relative_target(&name, &new_target);
                    }
                }
                copied_rels.push(rel);
            }
            base.set_relationships(&name, &copied_rels)?;
        }

        tracing::trace!(from = part, to = %name, "copied part");
        Ok(name)
    }
}

/// Re-creates relationships of one source part on one base part.
///
/// Ids are imported on demand, so only relationships that copied content
/// actually references end up in the base.
#[derive(Debug)]
pub struct Linker {
    source_part: String,
    base_part: String,
    source_rels: Relationships,
    base_rels: Relationships,
    ids: HashMap<String, String>,
}

impl Linker {
    /// Link `source_part` of `source` to `base_part` of `base`.
    pub fn new(source: &Package, source_part: &str, base: &Package, base_part: &str) -> Result<Self> {
        Ok(Self {
            source_part: source_part.to_string(),
            base_part: base_part.to_string(),
            source_rels: source.relationships(source_part)?,
            base_rels: base.relationships(base_part)?,
            ids: HashMap::new(),
        })
    }

    /// Import the source relationship `id` unless already done.
    ///
    /// Unknown ids are left alone.
    pub fn import(
        &mut self,
        id: &str,
        copier: &mut PartCopier,
        source: &Package,
        base: &mut Package,
    ) -> Result<()> {
        if self.ids.contains_key(id) {
            return Ok(());
        }
        let Some(rel) = self.source_rels.get(id).cloned() else {
            return Ok(());
        };

        let new_id = if rel.external {
            self.base_rels.add(&rel.rel_type, &rel.target, true)
        } else {
            let target = resolve_target(&self.source_part, &rel.target);
            let new_part = if source.contains(&target) {
                copier.copy(source, base, &target)?
            } else {
                tracing::warn!(part = %target, "relationship target is missing, keeping dangling link");
                target
            };
            let target = relative_target(&self.base_part, &new_part);
            self.base_rels.add(&rel.rel_type, &target, false)
        };

        self.ids.insert(id.to_string(), new_id);
        Ok(())
    }

    /// New id of an imported relationship.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.ids.get(id).map(String::as_str)
    }

    /// Store the base part's relationships and return how many were added.
    pub fn finish(self, base: &mut Package) -> Result<usize> {
        if !self.ids.is_empty() {
            base.set_relationships(&self.base_part, &self.base_rels)?;
        }
        Ok(self.ids.len())
    }
}

/// One child of a part's root element.
#[derive(Debug, Clone)]
pub struct Child {
    /// Local name of the child.
    pub name: Vec<u8>,
    /// Byte range of the whole child element.
    pub range: Range<usize>,
    /// The child's start tag.
    pub element: BytesStart<'static>,
}

/// Byte layout of an XML part: its root tag and the root's children.
#[derive(Debug, Clone)]
pub struct RootLayout {
    /// Byte range of the root start tag.
    pub root_range: Range<usize>,
    /// The root start tag.
    pub root: BytesStart<'static>,
    /// The root is self-closing.
    pub root_empty: bool,
    /// Element children of the root, in order.
    pub children: Vec<Child>,
    /// Offset of the root end tag, when there is one.
    pub close_start: Option<usize>,
}

impl RootLayout {
    /// Children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a [u8]) -> impl Iterator<Item = &'a Child> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Scan `bytes` for the root element and its direct children.
pub fn root_layout(bytes: &[u8]) -> Result<RootLayout> {
    let mut reader = xml::reader(bytes);
    let mut depth = 0usize;
    let mut root: Option<(Range<usize>, BytesStart<'static>, bool)> = None;
    let mut children = Vec::new();
    let mut open_child: Option<(usize, Vec<u8>, BytesStart<'static>)> = None;
    let mut close_start = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => {
                if root.is_none() {
                    root = Some((before..after, e.into_owned(), false));
                } else if depth == 1 {
                    open_child = Some((before, e.local_name().as_ref().to_vec(), e.into_owned()));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if root.is_none() {
                    root = Some((before..after, e.into_owned(), true));
                    break;
                } else if depth == 1 {
                    children.push(Child {
                        name: e.local_name().as_ref().to_vec(),
                        range: before..after,
                        element: e.into_owned(),
                    });
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1
                    && let Some((start, name, element)) = open_child.take()
                {
                    children.push(Child {
                        name,
                        range: start..after,
                        element,
                    });
                } else if depth == 0 {
                    close_start = Some(before);
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (root_range, root, root_empty) =
        root.ok_or_else(|| DocxCatError::other("part has no root element"))?;

    Ok(RootLayout {
        root_range,
        root,
        root_empty,
        children,
        close_start,
    })
}

/// Namespace prefixes bound to the relationships namespace on `element`.
pub fn relationship_prefixes(element: &BytesStart<'_>) -> Result<Vec<Vec<u8>>> {
    let mut prefixes = Vec::new();
    for attribute in element.attributes() {
        let attribute = attribute?;
        if let Some(prefix) = attribute.key.as_ref().strip_prefix(b"xmlns:") {
            let value = attribute.unescape_value()?;
            if value == xml::NS_R || value == NS_R_STRICT {
                prefixes.push(prefix.to_vec());
            }
        }
    }
    Ok(prefixes)
}

/// Markup compatibility namespace (the `mc:` prefix).
const NS_MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

/// Add the namespace declarations of the source root that the base root
/// lacks, and merge their `mc:Ignorable` lists.
///
/// Content copied from the source keeps its prefixes, so they must be bound
/// in the base part as well.
pub fn merge_root_namespaces(base: &[u8], source: &[u8]) -> Result<Vec<u8>> {
    let base_layout = root_layout(base)?;
    let source_layout = root_layout(source)?;

    let mut declared: Vec<Vec<u8>> = Vec::new();
    let mut ignorable: Vec<String> = Vec::new();
    let mut has_ignorable = false;
    let mut mc_prefix = None;
    for attribute in base_layout.root.attributes() {
        let attribute = attribute?;
        let key = attribute.key.as_ref();
        let value = attribute.unescape_value()?;
        if is_ignorable(key) {
            has_ignorable = true;
            ignorable.extend(value.split_whitespace().map(str::to_string));
        }
        if value == NS_MC
            && let Some(prefix) = key.strip_prefix(b"xmlns:")
        {
            mc_prefix = Some(String::from_utf8_lossy(prefix).into_owned());
        }
        declared.push(key.to_vec());
    }

    let mut missing: Vec<(String, String)> = Vec::new();
    let mut extra_ignorable: Vec<String> = Vec::new();
    for attribute in source_layout.root.attributes() {
        let attribute = attribute?;
        let key = attribute.key.as_ref();
        let value = attribute.unescape_value()?.into_owned();
        if key.starts_with(b"xmlns") {
            if declared.iter().any(|d| d == key) {
                continue;
            }
            if value == NS_MC
                && let Some(prefix) = key.strip_prefix(b"xmlns:")
            {
                mc_prefix.get_or_insert_with(|| String::from_utf8_lossy(prefix).into_owned());
            }
            missing.push((String::from_utf8_lossy(key).into_owned(), value));
        } else if is_ignorable(key) {
            for prefix in value.split_whitespace() {
                if !ignorable.iter().any(|p| p == prefix)
                    && !extra_ignorable.iter().any(|p| p == prefix)
                {
                    extra_ignorable.push(prefix.to_string());
                }
            }
        }
    }

    if missing.is_empty() && extra_ignorable.is_empty() {
        return Ok(base.to_vec());
    }

    let extra = extra_ignorable.join(" ");
    let mut root = xml::rewrite_attributes(&base_layout.root, |key, value| {
        (is_ignorable(key) && !extra.is_empty()).then(|| format!("{value} {extra}"))
    })?;
    for (key, value) in &missing {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    if !has_ignorable
        && !extra.is_empty()
        && let Some(prefix) = mc_prefix
    {
        let key = format!("{prefix}:Ignorable");
        root.push_attribute((key.as_str(), extra.as_str()));
    }

    let mut writer = Writer::new(Vec::new());
    if base_layout.root_empty {
        writer.write_event(Event::Empty(root))?;
    } else {
        writer.write_event(Event::Start(root))?;
    }

    let mut merged = Vec::with_capacity(base.len() + 256);
    merged.extend_from_slice(&base[..base_layout.root_range.start]);
    merged.extend_from_slice(&writer.into_inner());
    merged.extend_from_slice(&base[base_layout.root_range.end..]);
    Ok(merged)
}

/// True for an `Ignorable` attribute, whatever its prefix.
fn is_ignorable(key: &[u8]) -> bool {
    key == b"Ignorable" || key.ends_with(b":Ignorable")
}

/// Splice `insert` into `bytes` at `offset`.
pub fn insert_at(bytes: &[u8], offset: usize, insert: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + insert.len());
    out.extend_from_slice(&bytes[..offset]);
    out.extend_from_slice(insert);
    out.extend_from_slice(&bytes[offset..]);
    out
}

/// Parse a numeric attribute value and add `offset`.
pub fn offset_id(value: &str, offset: u64) -> Option<String> {
    value.parse::<u64>().ok().map(|id| (id + offset).to_string())
}

/// Largest numeric value of attribute `attr` on elements named `element`.
pub fn max_attribute(bytes: &[u8], element: &[u8], attr: &[u8]) -> Result<Option<u64>> {
    let mut reader = xml::reader(bytes);
    let mut highest = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                if let Some(value) = xml::attr(&e, attr)?.and_then(|v| v.parse::<u64>().ok()) {
                    highest = highest.max(Some(value));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(highest)
}
