//! Shared helpers for the integration tests.
//!
//! Fixtures are generated on the fly: a minimal document from
//! [`OutputDocument`] whose body can be replaced with hand-written XML.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use docxcat::config::{Config, OverwriteMode};
use docxcat::io::{DocxWriter, OutputDocument, Paragraph, SourceDocument};
use tempfile::TempDir;

/// Create a temporary directory for fixtures and output.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Write a document with one plain paragraph per entry.
pub fn write_docx(dir: &TempDir, name: &str, paragraphs: &[&str]) -> PathBuf {
    let mut doc = OutputDocument::new();
    for text in paragraphs {
        doc.add_paragraph(text);
    }
    let path = dir.path().join(name);
    doc.save(&path).expect("Failed to write fixture");
    path
}

/// Write a document whose body content is `body_xml`.
///
/// The body keeps the section properties of the generated document, so
/// `body_xml` only needs block-level content.
pub fn write_docx_with_body(dir: &TempDir, name: &str, body_xml: &str) -> PathBuf {
    let mut package = OutputDocument::new()
        .to_package()
        .expect("Failed to build fixture package");
    let main = package
        .main_document_part()
        .expect("Fixture has no main part");
    let xml = String::from_utf8(package.part(&main).expect("Fixture main part").to_vec())
        .expect("Fixture is not UTF-8")
        .replacen("<w:body>", &format!("<w:body>{body_xml}"), 1);
    package.set_part(&main, xml.into_bytes());

    let path = dir.path().join(name);
    DocxWriter::new()
        .save(&package, &path)
        .expect("Failed to write fixture");
    path
}

/// A run with explicit on/off formatting elements.
pub fn formatted_run(text: &str, properties: &str) -> String {
    format!("<w:r><w:rPr>{properties}</w:rPr><w:t xml:space=\"preserve\">{text}</w:t></w:r>")
}

/// A one-row, one-cell table holding `text`.
pub fn table(text: &str) -> String {
    format!("<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>")
}

/// Read back the body paragraphs of a document.
pub fn paragraphs(path: &Path) -> Vec<Paragraph> {
    SourceDocument::open(path)
        .expect("Failed to read merged document")
        .paragraphs
}

/// Read back the paragraph texts of a document.
pub fn texts(path: &Path) -> Vec<String> {
    paragraphs(path).iter().map(|p| p.text()).collect()
}

/// Raw XML of the main document part.
pub fn main_xml(path: &Path) -> String {
    let package = docxcat::io::Package::open(path).expect("Failed to open package");
    let main = package.main_document_part().expect("No main part");
    String::from_utf8(package.part(&main).expect("Main part").to_vec()).expect("Not UTF-8")
}

/// A quiet configuration that overwrites its output.
pub fn quiet_config<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Config {
    let mut config = Config::new(inputs.iter().map(|p| p.as_ref().to_path_buf()), output);
    config.quiet = true;
    config.overwrite_mode = OverwriteMode::Force;
    config
}
