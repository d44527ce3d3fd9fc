//! Building and saving output documents.
//!
//! [`OutputDocument`] collects paragraphs and serialises them into a minimal
//! `.docx` package (document, styles, relationships, content types).
//! [`DocxWriter`] persists any [`Package`] to disk with:
//! - Atomic writes (write to temp file, then rename)
//! - Parent directory creation
//! - Cleanup of the temporary file on failure
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use docxcat::io::OutputDocument;
//! use std::path::Path;
//!
//! # fn example() -> docxcat::Result<()> {
//! let mut doc = OutputDocument::new();
//! doc.add_heading("Intro", 1);
//! doc.add_paragraph("Hello").runs[0].bold(Some(true));
//! doc.add_page_break();
//! doc.save(Path::new("output.docx"))?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{DocxCatError, Result};
use crate::io::content_types::{CT_DOCUMENT, CT_STYLES};
use crate::io::document::{Paragraph, Run, RunFormat};
use crate::io::package::{DEFAULT_DOCUMENT_PART, Package};
use crate::io::relationships::{RT_PREFIX, Relationships};
use crate::io::xml;

/// Highest heading level with a built-in style.
pub const MAX_HEADING_LEVEL: u8 = 9;

const STYLES_PART: &str = "word/styles.xml";

/// Document under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    paragraphs: Vec<Paragraph>,
}

impl OutputDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a paragraph holding `text`; empty text gives an empty paragraph.
    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        self.push(Paragraph::new(text))
    }

    /// Append a heading.
    ///
    /// Level 0 uses the `Title` style, levels 1-9 `Heading1`..`Heading9`.
    /// Higher levels are clamped to 9.
    pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Paragraph {
        let mut paragraph = Paragraph::new(text);
        paragraph.style = Some(heading_style(level));
        self.push(paragraph)
    }

    /// Append a paragraph holding a single page break.
    pub fn add_page_break(&mut self) -> &mut Paragraph {
        let mut paragraph = Paragraph::default();
        paragraph.add_run("").page_break = true;
        self.push(paragraph)
    }

    /// Paragraphs added so far.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Number of paragraphs added so far.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Number of page breaks across all paragraphs.
    pub fn page_break_count(&self) -> usize {
        self.paragraphs
            .iter()
            .flat_map(|p| &p.runs)
            .filter(|run| run.page_break)
            .count()
    }

    /// Serialise into a package.
    pub fn to_package(&self) -> Result<Package> {
        let mut package = Package::new();

        let mut package_rels = Relationships::new();
        package_rels.add(
            &format!("{RT_PREFIX}officeDocument"),
            DEFAULT_DOCUMENT_PART,
            false,
        );
        package.set_relationships("", &package_rels)?;

        package.set_part(DEFAULT_DOCUMENT_PART, self.document_xml()?);
        package.set_part(STYLES_PART, styles_xml().into_bytes());

        let mut document_rels = Relationships::new();
        document_rels.add(&format!("{RT_PREFIX}styles"), "styles.xml", false);
        package.set_relationships(DEFAULT_DOCUMENT_PART, &document_rels)?;

        let types = package.content_types_mut();
        types.set_override(DEFAULT_DOCUMENT_PART, CT_DOCUMENT);
        types.set_override(STYLES_PART, CT_STYLES);

        Ok(package)
    }

    /// Save the document to `path`, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<WriteStatistics> {
        DocxWriter::new().save(&self.to_package()?, path)
    }

    fn push(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.paragraphs.push(paragraph);
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    fn document_xml(&self) -> Result<Vec<u8>> {
        let mut writer = xml::writer()?;
        let mut root = BytesStart::new("w:document");
        root.push_attribute(("xmlns:w", xml::NS_W));
        root.push_attribute(("xmlns:r", xml::NS_R));
        writer.write_event(Event::Start(root))?;
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        for paragraph in &self.paragraphs {
            write_paragraph(&mut writer, paragraph)?;
        }

        writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
        let mut size = BytesStart::new("w:pgSz");
        size.push_attribute(("w:w", "12240"));
        size.push_attribute(("w:h", "15840"));
        writer.write_event(Event::Empty(size))?;
        let mut margins = BytesStart::new("w:pgMar");
        for (side, value) in [
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ] {
            margins.push_attribute((side, value));
        }
        writer.write_event(Event::Empty(margins))?;
        writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;

        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        writer.write_event(Event::End(BytesEnd::new("w:document")))?;
        Ok(writer.into_inner())
    }
}

/// Style id used for a heading of `level`.
pub fn heading_style(level: u8) -> String {
    match level {
        0 => "Title".to_string(),
        n => format!("Heading{}", n.min(MAX_HEADING_LEVEL)),
    }
}

fn write_paragraph(writer: &mut Writer<Vec<u8>>, paragraph: &Paragraph) -> Result<()> {
    if paragraph.style.is_none() && paragraph.runs.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    if let Some(style) = &paragraph.style {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        let mut element = BytesStart::new("w:pStyle");
        element.push_attribute(("w:val", style.as_str()));
        writer.write_event(Event::Empty(element))?;
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }
    for run in &paragraph.runs {
        write_run(writer, run)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_run(writer: &mut Writer<Vec<u8>>, run: &Run) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    write_run_properties(writer, &run.format)?;

    if run.page_break {
        let mut br = BytesStart::new("w:br");
        br.push_attribute(("w:type", "page"));
        writer.write_event(Event::Empty(br))?;
    }

    let mut pending = String::new();
    for c in run.text.chars() {
        match c {
            '\t' | '\n' => {
                write_text(writer, &mut pending)?;
                let name = if c == '\t' { "w:tab" } else { "w:br" };
                writer.write_event(Event::Empty(BytesStart::new(name)))?;
            }
            '\r' => {}
            other => pending.push(other),
        }
    }
    write_text(writer, &mut pending)?;

    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn write_run_properties(writer: &mut Writer<Vec<u8>>, format: &RunFormat) -> Result<()> {
    if format.is_unset() {
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
    for (name, value) in [("w:b", format.bold), ("w:i", format.italic)] {
        match value {
            Some(true) => writer.write_event(Event::Empty(BytesStart::new(name)))?,
            Some(false) => {
                let mut element = BytesStart::new(name);
                element.push_attribute(("w:val", "0"));
                writer.write_event(Event::Empty(element))?;
            }
            None => {}
        }
    }
    if let Some(underline) = format.underline {
        let mut element = BytesStart::new("w:u");
        element.push_attribute(("w:val", if underline { "single" } else { "none" }));
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, pending: &mut String) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    let mut element = BytesStart::new("w:t");
    element.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(pending.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    pending.clear();
    Ok(())
}

fn styles_xml() -> String {
    const HEADING_SIZES: [u8; 9] = [32, 26, 24, 22, 22, 22, 22, 22, 22];

    let mut styles = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{}"><w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/><w:uiPriority w:val="1"/><w:semiHidden/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="10"/><w:qFormat/><w:pPr><w:spacing w:after="80"/><w:contextualSpacing/></w:pPr><w:rPr><w:sz w:val="56"/><w:szCs w:val="56"/></w:rPr></w:style>"#,
        xml::NS_W
    );

    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        styles.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{index}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#
        ));
    }

    styles.push_str("</w:styles>");
    styles
}

/// Options for writing packages.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Create missing parent directories of the output.
    pub create_dirs: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            create_dirs: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Number of parts in the written package.
    pub part_count: usize,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Package writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    options: WriteOptions,
}

impl DocxWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        })
    }

    /// Save a package to `path` and return statistics about the write.
    ///
    /// With atomic writes the package is first written to a sibling file
    /// named after `path` with `.tmp` appended and renamed into place; on failure the
    /// temporary file is removed and `path` is left untouched.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::FailedToCreateOutput`] when the file or its parent
    ///   directory cannot be created
    /// - [`DocxCatError::FailedToWrite`] when writing or renaming fails
    pub fn save(&self, package: &Package, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if self.options.create_dirs
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| DocxCatError::FailedToCreateOutput {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let write_path = if self.options.atomic {
            temp_path(path)
        } else {
            path.to_path_buf()
        };

        if let Err(e) = self.write_file(package, &write_path) {
            let _ = fs::remove_file(&write_path);
            return Err(e);
        }

        if self.options.atomic
            && let Err(e) = fs::rename(&write_path, path)
        {
            let _ = fs::remove_file(&write_path);
            return Err(DocxCatError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }

        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let stats = WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
            part_count: package.part_count() + 1,
        };

        tracing::debug!(
            path = %path.display(),
            size = %stats.format_file_size(),
            parts = stats.part_count,
            "wrote package"
        );

        Ok(stats)
    }

    fn write_file(&self, package: &Package, write_path: &Path) -> Result<()> {
        let file = fs::File::create(write_path).map_err(|e| DocxCatError::FailedToCreateOutput {
            path: write_path.to_path_buf(),
            source: e,
        })?;

        let failed = |source: std::io::Error| DocxCatError::FailedToWrite {
            path: write_path.to_path_buf(),
            source,
        };

        let writer = BufWriter::with_capacity(self.options.buffer_size, file);
        let mut writer = package.write_zip(writer).map_err(|e| match e {
            DocxCatError::Io { source } => failed(source),
            other => failed(std::io::Error::other(other.to_string())),
        })?;
        writer.flush().map_err(failed)?;

        Ok(())
    }
}

/// Sibling of `path` used for atomic writes: `out.docx` becomes
/// `out.docx.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
