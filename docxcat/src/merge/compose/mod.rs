//! Full-fidelity merge engine.
//!
//! The first source becomes the base package. The body of every further
//! source is spliced in after the base's content, together with everything
//! it references: images, hyperlinks, headers and footers, charts, embedded
//! objects, styles, numbering and notes. Each source keeps its own section
//! properties, so page setup and headers/footers stay with the content they
//! belong to.
//!
//! Headings and page breaks requested in [`MergeOptions`](crate::config::MergeOptions)
//! are not applied by this engine; every appended document starts a new
//! section at the section break its predecessor ends with.

mod body;
mod notes;
mod numbering;
mod parts;
mod styles;

use std::path::{Path, PathBuf};

use crate::error::{DocxCatError, Result};
use crate::io::reader::parse_paragraphs;
use crate::io::{DocxWriter, Package, WriteStatistics};
use crate::merge::EngineReport;

use body::{BodyLayout, ContentRewriter, Remap, body_layout};
use notes::{NoteKind, import_notes};
use numbering::import_numbering;
use parts::{Linker, PartCopier, max_attribute, merge_root_namespaces, relationship_prefixes, root_layout};
use styles::import_styles;

/// Splices whole documents into the first one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Composer;

/// What appending one source added to the base.
#[derive(Debug, Default)]
struct Appended {
    paragraphs: usize,
    parts_copied: usize,
    styles: usize,
    dropped: usize,
}

impl Composer {
    /// Create a composer.
    pub fn new() -> Self {
        Self
    }

    /// Merge `files` into one package in memory.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::NoFilesToMerge`] when `files` is empty
    /// - storage and format errors of the first source that fails, naming
    ///   that source
    pub fn compose(&self, files: &[PathBuf]) -> Result<(Package, EngineReport)> {
        let Some((first, rest)) = files.split_first() else {
            return Err(DocxCatError::NoFilesToMerge);
        };

        let mut report = EngineReport::default();
        let (mut base, base_main) = load(first, &mut report)?;
        let base_xml = base.part(&base_main).unwrap_or_default();
        report.paragraphs += parse_paragraphs(base_xml)
            .map_err(|e| e.in_document(first))?
            .len();
        tracing::debug!(path = %first.display(), "using as base document");

        for path in rest {
            let (source, source_main) = load(path, &mut report)?;
            let appended = append(&mut base, &base_main, &source, &source_main)
                .map_err(|e| e.in_document(path))?;

            tracing::debug!(
                path = %path.display(),
                paragraphs = appended.paragraphs,
                parts = appended.parts_copied,
                styles = appended.styles,
                "appended document"
            );
            if appended.dropped > 0 {
                tracing::debug!(
                    path = %path.display(),
                    elements = appended.dropped,
                    "dropped comment anchors"
                );
            }

            report.paragraphs += appended.paragraphs;
            report.parts_copied += appended.parts_copied;
        }

        Ok((base, report))
    }

    /// Merge `files` and save the result to `output`.
    ///
    /// Nothing is written unless every source was merged successfully.
    pub fn merge(&self, files: &[PathBuf], output: &Path) -> Result<(EngineReport, WriteStatistics)> {
        let (package, report) = self.compose(files)?;
        let stats = DocxWriter::new().save(&package, output)?;
        Ok((report, stats))
    }
}

/// Open a source and locate its main document part.
fn load(path: &Path, report: &mut EngineReport) -> Result<(Package, String)> {
    let package = Package::open(path)?;
    let main = package
        .main_document_part()
        .map_err(|e| e.in_document(path))?;
    if !package.contains(&main) {
        return Err(DocxCatError::missing_part(path.to_path_buf(), main));
    }
    report.input_size += std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    Ok((package, main))
}

/// Append the body of `source` to the body of `base`.
fn append(base: &mut Package, base_main: &str, source: &Package, source_main: &str) -> Result<Appended> {
    let source_xml = source.part(source_main).unwrap_or_default();
    let source_layout = body_layout(source_xml)?;
    let base_xml = base.part(base_main).unwrap_or_default().to_vec();
    let base_layout = body_layout(&base_xml)?;

    let mut copier = PartCopier::new();
    let mut base_rels = base.relationships(base_main)?;
    let numbering = import_numbering(source, source_main, base, base_main, &mut base_rels, &mut copier)?;
    let styles = import_styles(
        source,
        source_main,
        base,
        base_main,
        &mut base_rels,
        &mut copier,
        &numbering,
    )?;

    let mut remap = Remap {
        bookmark_offset: next_id(&base_xml, b"bookmarkStart")?,
        drawing_offset: next_id(&base_xml, b"docPr")?,
        numbering,
        ..Default::default()
    };
    remap.footnotes = import_notes(
        NoteKind::Footnotes,
        source,
        source_main,
        base,
        base_main,
        &mut base_rels,
        &mut copier,
        &remap,
    )?;
    remap.endnotes = import_notes(
        NoteKind::Endnotes,
        source,
        source_main,
        base,
        base_main,
        &mut base_rels,
        &mut copier,
        &remap,
    )?;
    base.set_relationships(base_main, &base_rels)?;

    let prefixes = relationship_prefixes(&root_layout(source_xml)?.root)?;
    let mut linker = Linker::new(source, source_main, base, base_main)?;
    let (content, sect_pr, dropped) = {
        let mut rewriter = ContentRewriter::new(source, base, &mut copier, &mut linker, &remap, prefixes);
        let content = rewriter.rewrite_fragment(&source_xml[source_layout.content()])?;
        let sect_pr = match source_layout.sect_pr.clone() {
            Some(range) => Some(rewriter.rewrite_fragment(&source_xml[range])?),
            None => None,
        };
        (content, sect_pr, rewriter.dropped())
    };

    let document = splice(&base_xml, &base_layout, &content, sect_pr.as_deref());
    base.set_part(base_main, merge_root_namespaces(&document, source_xml)?);
    linker.finish(base)?;

    Ok(Appended {
        paragraphs: parse_paragraphs(source_xml)?.len(),
        parts_copied: copier.copied(),
        styles,
        dropped,
    })
}

/// One past the largest `id` on elements named `element`, 0 when none.
fn next_id(bytes: &[u8], element: &[u8]) -> Result<u64> {
    Ok(max_attribute(bytes, element, b"id")?.map_or(0, |max| max + 1))
}

/// Build the new main document: base content, appended content, then the
/// final section properties.
///
/// When both documents carry final section properties, the base's are
/// moved into a section-break paragraph ending the base content and the
/// appended document's take their place. Without appended section
/// properties the base's final section simply grows.
fn splice(base: &[u8], layout: &BodyLayout, content: &[u8], sect_pr: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::with_capacity(base.len() + content.len() + 256);

    match (layout.sect_pr.clone(), sect_pr) {
        (Some(base_sect), Some(source_sect)) => {
            let prefix = element_prefix(&base[base_sect.clone()]);
            out.extend_from_slice(&base[..base_sect.start]);
            out.extend_from_slice(format!("<{prefix}p><{prefix}pPr>").as_bytes());
            out.extend_from_slice(&base[base_sect.clone()]);
            out.extend_from_slice(format!("</{prefix}pPr></{prefix}p>").as_bytes());
            out.extend_from_slice(content);
            out.extend_from_slice(source_sect);
            out.extend_from_slice(&base[base_sect.end..]);
        }
        (Some(base_sect), None) => {
            splice_at(&mut out, base, base_sect.start, &[content]);
        }
        (None, source_sect) => {
            splice_at(&mut out, base, layout.body_end, &[content, source_sect.unwrap_or_default()]);
        }
    }
    out
}

fn splice_at(out: &mut Vec<u8>, base: &[u8], at: usize, inserts: &[&[u8]]) {
    out.extend_from_slice(&base[..at]);
    for insert in inserts {
        out.extend_from_slice(insert);
    }
    out.extend_from_slice(&base[at..]);
}

/// Namespace prefix of the element starting `tag`, with its colon.
fn element_prefix(tag: &[u8]) -> String {
    let name_end = tag
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
        .unwrap_or(tag.len());
    let name = tag.get(1..name_end).unwrap_or_default();
    match name.iter().position(|b| *b == b':') {
        Some(colon) => format!("{}:", String::from_utf8_lossy(&name[..colon])),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::OutputDocument;
    use crate::io::relationships::RT_PREFIX;
    use tempfile::TempDir;

    fn document(paragraphs: &[&str]) -> Package {
        let mut doc = OutputDocument::new();
        for text in paragraphs {
            doc.add_paragraph(text);
        }
        doc.to_package().unwrap()
    }

    fn save(dir: &TempDir, name: &str, package: &Package) -> PathBuf {
        let path = dir.path().join(name);
        DocxWriter::new().save(package, &path).unwrap();
        path
    }

    fn main_xml(package: &Package) -> String {
        String::from_utf8(package.part("word/document.xml").unwrap().to_vec()).unwrap()
    }

    /// A document whose single paragraph shows an image.
    fn document_with_image(image: &[u8]) -> Package {
        let mut package = document(&[]);
        let mut rels = package.relationships("word/document.xml").unwrap();
        let id = rels.add(&format!("{RT_PREFIX}image"), "media/image1.png", false);
        package.set_relationships("word/document.xml", &rels).unwrap();
        package.set_part("word/media/image1.png", image.to_vec());
        package.content_types_mut().add_default("png", "image/png");

        let xml = main_xml(&package).replace(
            "<w:body>",
            &format!(
                r#"<w:body><w:p><w:bookmarkStart w:id="0" w:name="pic"/><w:r><w:drawing><wp:inline xmlns:wp="WP"><wp:docPr id="1" name="Picture"/><a:blip xmlns:a="A" r:embed="{id}"/></wp:inline></w:drawing></w:r><w:bookmarkEnd w:id="0"/></w:p>"#
            ),
        );
        package.set_part("word/document.xml", xml.into_bytes());
        package
    }

    /// A document with one list instance (`numId` 1) and, optionally, a
    /// list style pointing at it.
    fn document_with_list(list_style: bool) -> Package {
        let mut package = document(&["item"]);
        let mut rels = package.relationships("word/document.xml").unwrap();
        rels.add(&format!("{RT_PREFIX}numbering"), "numbering.xml", false);
        package.set_relationships("word/document.xml", &rels).unwrap();
        package.set_part(
            "word/numbering.xml",
            br#"<w:numbering xmlns:w="W"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"/></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#.to_vec(),
        );

        if list_style {
            let styles = String::from_utf8(package.part("word/styles.xml").unwrap().to_vec())
                .unwrap()
                .replace(
                    "</w:styles>",
                    r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style></w:styles>"#,
                );
            package.set_part("word/styles.xml", styles.into_bytes());
        }
        package
    }

    #[test]
    fn test_empty_input() {
        let err = Composer::new().compose(&[]).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_bodies_are_appended_in_order() {
        let dir = TempDir::new().unwrap();
        let a = save(&dir, "a.docx", &document(&["one"]));
        let b = save(&dir, "b.docx", &document(&["two", "three"]));

        let (package, report) = Composer::new().compose(&[a, b]).unwrap();

        let paragraphs = parse_paragraphs(package.part("word/document.xml").unwrap()).unwrap();
        let texts: Vec<_> = paragraphs.iter().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["one", "", "two", "three"]);
        assert_eq!(report.paragraphs, 3);

        // The base's section properties now close its own section.
        let xml = main_xml(&package);
        assert_eq!(xml.matches("<w:sectPr>").count(), 2);
        assert!(xml.contains("<w:p><w:pPr><w:sectPr>"));
        assert!(xml.ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn test_images_are_copied_with_fresh_names() {
        let dir = TempDir::new().unwrap();
        let a = save(&dir, "a.docx", &document_with_image(&[1, 2, 3]));
        let b = save(&dir, "b.docx", &document_with_image(&[4, 5, 6]));

        let (package, report) = Composer::new().compose(&[a, b]).unwrap();

        assert_eq!(report.parts_copied, 1);
        assert_eq!(package.part("word/media/image1.png"), Some(&[1u8, 2, 3][..]));
        assert_eq!(package.part("word/media/image1_2.png"), Some(&[4u8, 5, 6][..]));

        let rels = package.relationships("word/document.xml").unwrap();
        let xml = main_xml(&package);
        for rel in rels.iter().filter(|rel| rel.kind() == "image") {
            assert!(xml.contains(&format!(r#"r:embed="{}""#, rel.id)));
        }
        assert_eq!(rels.iter().filter(|rel| rel.kind() == "image").count(), 2);

        assert!(xml.contains(r#"<w:bookmarkStart w:id="1" w:name="pic"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="3" name="Picture"/>"#));
    }

    #[test]
    fn test_imported_list_style_uses_imported_numbering() {
        let dir = TempDir::new().unwrap();
        let a = save(&dir, "a.docx", &document_with_list(false));
        let b = save(&dir, "b.docx", &document_with_list(true));

        let (package, _) = Composer::new().compose(&[a, b]).unwrap();

        let numbering = String::from_utf8(package.part("word/numbering.xml").unwrap().to_vec()).unwrap();
        assert!(numbering.contains(r#"<w:num w:numId="3"><w:abstractNumId w:val="1"/></w:num>"#));

        let styles = String::from_utf8(package.part("word/styles.xml").unwrap().to_vec()).unwrap();
        assert!(styles.contains(
            r#"w:styleId="ListBullet"><w:pPr><w:numPr><w:numId w:val="3"/></w:numPr>"#
        ));
    }

    #[test]
    fn test_failed_source_is_named() {
        let dir = TempDir::new().unwrap();
        let a = save(&dir, "a.docx", &document(&["one"]));
        let broken = dir.path().join("broken.docx");
        std::fs::write(&broken, b"not a zip").unwrap();
        let output = dir.path().join("out.docx");

        let err = Composer::new().merge(&[a, broken.clone()], &output).unwrap_err();

        match err {
            DocxCatError::DocumentFormat { path, .. } => assert_eq!(path, broken),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_element_prefix() {
        assert_eq!(element_prefix(b"<w:sectPr w:rsidR=\"1\">"), "w:");
        assert_eq!(element_prefix(b"<sectPr/>"), "");
    }
}
