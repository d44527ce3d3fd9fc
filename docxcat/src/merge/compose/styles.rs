//! Importing style definitions.
//!
//! Styles are matched by `w:styleId`. A style the base already defines wins;
//! only styles missing from the base are copied. List styles carried over
//! have their `w:numId` moved to the ids the numbering import assigned.

use std::collections::{HashMap, HashSet};

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::io::Package;
use crate::io::relationships::{Relationships, relative_target, resolve_target};
use crate::io::xml;
use crate::merge::compose::parts::{PartCopier, insert_at, merge_root_namespaces, root_layout};

/// Import the styles of `source` into `base` and return how many were added.
///
/// When the base has no styles part, the source part is copied whole and
/// linked from `base_rels`. `numbering` is the `numId` translation returned
/// by the numbering import.
pub fn import_styles(
    source: &Package,
    source_main: &str,
    base: &mut Package,
    base_main: &str,
    base_rels: &mut Relationships,
    copier: &mut PartCopier,
    numbering: &HashMap<String, String>,
) -> Result<usize> {
    let source_rels = source.relationships(source_main)?;
    let Some(source_rel) = source_rels.find_kind("styles") else {
        return Ok(0);
    };
    let source_part = resolve_target(source_main, &source_rel.target);
    let Some(source_xml) = source.part(&source_part) else {
        return Ok(0);
    };
    let source_layout = root_layout(source_xml)?;
    let source_count = source_layout.children_named(b"style").count();

    let base_part = base_rels
        .find_kind("styles")
        .map(|rel| resolve_target(base_main, &rel.target))
        .filter(|part| base.contains(part));

    let Some(base_part) = base_part else {
        let copied = copier.copy(source, base, &source_part)?;
        if !numbering.is_empty() {
            let renumbered = renumber(base.part(&copied).unwrap_or_default(), numbering)?;
            base.set_part(&copied, renumbered);
        }
        base_rels.add(&source_rel.rel_type, &relative_target(base_main, &copied), false);
        return Ok(source_count);
    };

    let base_xml = base.part(&base_part).unwrap_or_default().to_vec();
    let base_layout = root_layout(&base_xml)?;
    let Some(close) = base_layout.close_start else {
        // Self-closing root: nothing defined yet.
        base.set_part(&base_part, renumber(source_xml, numbering)?);
        return Ok(source_count);
    };

    let mut known = HashSet::new();
    for style in base_layout.children_named(b"style") {
        if let Some(id) = xml::attr(&style.element, b"styleId")? {
            known.insert(id);
        }
    }

    let mut imported = Vec::new();
    let mut count = 0;
    for style in source_layout.children_named(b"style") {
        let Some(id) = xml::attr(&style.element, b"styleId")? else {
            continue;
        };
        if known.insert(id) {
            imported.extend_from_slice(&renumber(&source_xml[style.range.clone()], numbering)?);
            count += 1;
        }
    }

    if count > 0 {
        let merged = insert_at(&base_xml, close, &imported);
        base.set_part(&base_part, merge_root_namespaces(&merged, source_xml)?);
    }

    Ok(count)
}

/// Copy of `fragment` with every `w:numId/@w:val` translated through
/// `numbering`.
fn renumber(fragment: &[u8], numbering: &HashMap<String, String>) -> Result<Vec<u8>> {
    if numbering.is_empty() {
        return Ok(fragment.to_vec());
    }

    let mut reader = xml::reader(fragment);
    let mut writer = Writer::new(Vec::with_capacity(fragment.len()));
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"numId" => {
                writer.write_event(Event::Start(translate_num_id(&e, numbering)?))?
            }
            Event::Empty(e) if e.local_name().as_ref() == b"numId" => {
                writer.write_event(Event::Empty(translate_num_id(&e, numbering)?))?
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }
    Ok(writer.into_inner())
}

fn translate_num_id(
    element: &BytesStart<'_>,
    numbering: &HashMap<String, String>,
) -> Result<BytesStart<'static>> {
    xml::rewrite_attributes(element, |key, value| {
        let local = key.rsplit(|b| *b == b':').next().unwrap_or(key);
        if local == b"val" {
            numbering.get(value).cloned()
        } else {
            None
        }
    })
}
