//! Importing list numbering definitions.
//!
//! Every abstract definition and numbering instance of the source is copied
//! with ids moved past the base's highest ones, so lists of different
//! documents never share a definition. Picture bullets are not carried: the
//! imported levels fall back to their text bullets.

use std::collections::HashMap;

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::io::Package;
use crate::io::relationships::{Relationships, relative_target, resolve_target};
use crate::io::xml;
use crate::merge::compose::parts::{PartCopier, RootLayout, merge_root_namespaces, root_layout};

/// Picture bullet reference inside a level definition.
const PICTURE_BULLET: &[u8] = b"lvlPicBulletId";

/// Import numbering of `source` into `base`.
///
/// Returns the `numId` translation to apply to copied paragraphs. An empty
/// map means ids are kept as they are.
pub fn import_numbering(
    source: &Package,
    source_main: &str,
    base: &mut Package,
    base_main: &str,
    base_rels: &mut Relationships,
    copier: &mut PartCopier,
) -> Result<HashMap<String, String>> {
    let source_rels = source.relationships(source_main)?;
    let Some(source_rel) = source_rels.find_kind("numbering") else {
        return Ok(HashMap::new());
    };
    let source_part = resolve_target(source_main, &source_rel.target);
    let Some(source_xml) = source.part(&source_part) else {
        return Ok(HashMap::new());
    };

    let base_part = base_rels
        .find_kind("numbering")
        .map(|rel| resolve_target(base_main, &rel.target))
        .filter(|part| base.contains(part));

    let Some(base_part) = base_part else {
        let copied = copier.copy(source, base, &source_part)?;
        base_rels.add(&source_rel.rel_type, &relative_target(base_main, &copied), false);
        return Ok(HashMap::new());
    };

    let base_xml = base.part(&base_part).unwrap_or_default().to_vec();
    let base_layout = root_layout(&base_xml)?;
    let base_abstract = base_layout.children_named(b"abstractNum").count();
    let base_num = base_layout.children_named(b"num").count();
    let Some(close) = base_layout.close_start.filter(|_| base_abstract + base_num > 0) else {
        base.set_part(&base_part, source_xml.to_vec());
        return Ok(HashMap::new());
    };

    let abstract_offset = max_id(&base_layout, b"abstractNum", b"abstractNumId")? + 1;
    let num_offset = max_id(&base_layout, b"num", b"numId")? + 1;

    let source_layout = root_layout(source_xml)?;
    let mut abstract_ids = HashMap::new();
    let mut num_ids = HashMap::new();
    for child in &source_layout.children {
        let (attr, offset, map) = match child.name.as_slice() {
            b"abstractNum" => (&b"abstractNumId"[..], abstract_offset, &mut abstract_ids),
            b"num" => (&b"numId"[..], num_offset, &mut num_ids),
            _ => continue,
        };
        if let Some(id) = xml::attr(&child.element, attr)?
            && let Ok(value) = id.parse::<u64>()
        {
            map.insert(id, (value + offset).to_string());
        }
    }

    let mut abstracts = Writer::new(Vec::new());
    let mut nums = Writer::new(Vec::new());
    for child in &source_layout.children {
        let writer = match child.name.as_slice() {
            b"abstractNum" => &mut abstracts,
            b"num" => &mut nums,
            _ => continue,
        };
        copy_definition(&source_xml[child.range.clone()], writer, &abstract_ids, &num_ids)?;
    }

    // Schema order: numPicBullet*, abstractNum*, num*, numIdMacAtCleanup?
    let cleanup = base_layout
        .children_named(b"numIdMacAtCleanup")
        .next()
        .map(|child| child.range.start);
    let num_at = base_layout
        .children_named(b"num")
        .last()
        .map(|child| child.range.end)
        .or(cleanup)
        .unwrap_or(close);
    let abstract_at = base_layout
        .children_named(b"abstractNum")
        .last()
        .map(|child| child.range.end)
        .or_else(|| base_layout.children_named(b"num").next().map(|c| c.range.start))
        .unwrap_or(num_at);

    let mut merged = Vec::with_capacity(base_xml.len() + source_xml.len());
    merged.extend_from_slice(&base_xml[..abstract_at]);
    merged.extend_from_slice(&abstracts.into_inner());
    merged.extend_from_slice(&base_xml[abstract_at..num_at]);
    merged.extend_from_slice(&nums.into_inner());
    merged.extend_from_slice(&base_xml[num_at..]);
    base.set_part(&base_part, merge_root_namespaces(&merged, source_xml)?);

    tracing::debug!(
        abstract_definitions = abstract_ids.len(),
        instances = num_ids.len(),
        "imported numbering"
    );
    Ok(num_ids)
}

/// Highest numeric value of `attr` on root children named `name`, 0 when
/// there is none.
fn max_id(layout: &RootLayout, name: &[u8], attr: &[u8]) -> Result<u64> {
    let mut highest = 0;
    for child in layout.children_named(name) {
        if let Some(value) = xml::attr(&child.element, attr)?.and_then(|v| v.parse().ok()) {
            highest = highest.max(value);
        }
    }
    Ok(highest)
}

/// Copy one `w:abstractNum` or `w:num`, translating its ids.
fn copy_definition(
    fragment: &[u8],
    writer: &mut Writer<Vec<u8>>,
    abstract_ids: &HashMap<String, String>,
    num_ids: &HashMap<String, String>,
) -> Result<()> {
    let mut reader = xml::reader(fragment);
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event()?;
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) if e.local_name().as_ref() == PICTURE_BULLET => skip_depth = 1,
            Event::Empty(e) if e.local_name().as_ref() == PICTURE_BULLET => {}
            Event::Start(e) => {
                let element = translate(&e, abstract_ids, num_ids)?;
                writer.write_event(Event::Start(element))?;
            }
            Event::Empty(e) => {
                let element = translate(&e, abstract_ids, num_ids)?;
                writer.write_event(Event::Empty(element))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }
    Ok(())
}

fn translate(
    element: &BytesStart<'_>,
    abstract_ids: &HashMap<String, String>,
    num_ids: &HashMap<String, String>,
) -> Result<BytesStart<'static>> {
    let local = element.local_name().as_ref().to_vec();
    xml::rewrite_attributes(element, |key, value| {
        let attr = key.rsplit(|b| *b == b':').next().unwrap_or(key);
        match (local.as_slice(), attr) {
            (b"abstractNum", b"abstractNumId") | (b"abstractNumId", b"val") => {
                abstract_ids.get(value).cloned()
            }
            (b"num", b"numId") => num_ids.get(value).cloned(),
            _ => None,
        }
    })
}
