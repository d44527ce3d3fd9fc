//! Reading source documents.
//!
//! A source is reduced to its body-level paragraphs and their runs. Runs
//! wrapped in hyperlinks, tracked insertions, smart tags and simple fields
//! are included; tables, drawings, headers and footers are not.
//!
//! # Examples
//!
//! ```no_run
//! use docxcat::io::SourceDocument;
//! use std::path::Path;
//!
//! # fn example() -> docxcat::Result<()> {
//! let doc = SourceDocument::open(Path::new("chapter1.docx"))?;
//! for paragraph in &doc.paragraphs {
//!     println!("{}", paragraph.text());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use quick_xml::events::{BytesStart, Event};

use crate::error::{DocxCatError, Result};
use crate::io::document::{Paragraph, Run};
use crate::io::package::Package;
use crate::io::xml;

/// Elements that may sit between a paragraph and its runs.
const RUN_WRAPPERS: [&[u8]; 4] = [b"hyperlink", b"ins", b"smartTag", b"fldSimple"];

/// A source document opened for reading.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Path the document was read from.
    pub path: PathBuf,

    /// Body-level paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,

    /// File size in bytes.
    pub file_size: u64,

    /// Time taken to read and parse the document.
    pub load_time: Duration,
}

impl SourceDocument {
    /// Open and parse a `.docx` file.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::FileNotFound`] and other storage errors when the file
    ///   cannot be read
    /// - [`DocxCatError::DocumentFormat`] when it is not a zip archive or its
    ///   main document XML is malformed
    /// - [`DocxCatError::MissingPart`] when the main document part is absent
    pub fn open(path: &Path) -> Result<Self> {
        let start = Instant::now();
        let package = Package::open(path)?;
        let paragraphs = read_paragraphs(&package, path)?;
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path: path.to_path_buf(),
            paragraphs,
            file_size,
            load_time: start.elapsed(),
        })
    }

    /// Number of body paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Number of runs across all paragraphs.
    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.runs.len()).sum()
    }

    /// Final path component, as used for headings.
    pub fn base_name(&self) -> String {
        base_name(&self.path)
    }
}

/// Final path component of `path` as a string.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Parse the main document part of an opened package.
pub fn read_paragraphs(package: &Package, path: &Path) -> Result<Vec<Paragraph>> {
    let main = package
        .main_document_part()
        .map_err(|e| e.in_document(path))?;
    let xml = package
        .part(&main)
        .ok_or_else(|| DocxCatError::missing_part(path.to_path_buf(), main.clone()))?;
    parse_paragraphs(xml).map_err(|e| e.in_document(path))
}

/// Run being collected, with the stack depth of its `w:r` element.
struct OpenRun {
    depth: usize,
    run: Run,
    in_text: bool,
}

/// Paragraph being collected, with the stack depth of its `w:p` element.
struct OpenParagraph {
    depth: usize,
    paragraph: Paragraph,
    run: Option<OpenRun>,
}

/// Extract body-level paragraphs from a main document part.
pub fn parse_paragraphs(bytes: &[u8]) -> Result<Vec<Paragraph>> {
    let mut reader = xml::reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut open: Option<OpenParagraph> = None;
    let mut saw_body = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                saw_body |= name == b"body";
                handle_element(&e, &name, false, &stack, &mut open, &mut paragraphs)?;
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                saw_body |= name == b"body";
                handle_element(&e, &name, true, &stack, &mut open, &mut paragraphs)?;
            }
            Event::Text(t) => {
                if let Some(run) = open.as_mut().and_then(|p| p.run.as_mut())
                    && run.in_text
                {
                    run.run.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(run) = open.as_mut().and_then(|p| p.run.as_mut())
                    && run.in_text
                {
                    run.run.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                let depth = stack.len();
                let mut finished = false;
                if let Some(paragraph) = open.as_mut() {
                    if let Some(run) = paragraph.run.as_mut()
                        && depth == run.depth + 1
                        && closed.as_deref() == Some(&b"t"[..])
                    {
                        run.in_text = false;
                    }
                    if paragraph.run.as_ref().is_some_and(|run| run.depth == depth)
                        && let Some(run) = paragraph.run.take()
                    {
                        paragraph.paragraph.runs.push(run.run);
                    }
                    finished = depth == paragraph.depth;
                }
                if finished && let Some(paragraph) = open.take() {
                    paragraphs.push(paragraph.paragraph);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_body {
        return Err(DocxCatError::other("main document part has no w:body element"));
    }

    Ok(paragraphs)
}

/// React to an opening (or self-closing) element at depth `stack.len()`.
fn handle_element(
    element: &BytesStart<'_>,
    name: &[u8],
    empty: bool,
    stack: &[Vec<u8>],
    open: &mut Option<OpenParagraph>,
    paragraphs: &mut Vec<Paragraph>,
) -> Result<()> {
    let depth = stack.len();

    let Some(paragraph) = open.as_mut() else {
        if name == b"p" && stack.last().is_some_and(|parent| parent == b"body") {
            if empty {
                paragraphs.push(Paragraph::default());
            } else {
                *open = Some(OpenParagraph {
                    depth,
                    paragraph: Paragraph::default(),
                    run: None,
                });
            }
        }
        return Ok(());
    };

    let Some(run) = paragraph.run.as_mut() else {
        let pd = paragraph.depth;
        let wrapped = depth == pd + 2 && RUN_WRAPPERS.contains(&stack[pd + 1].as_slice());
        if name == b"r" && (depth == pd + 1 || wrapped) {
            if empty {
                paragraph.paragraph.runs.push(Run::default());
            } else {
                paragraph.run = Some(OpenRun {
                    depth,
                    run: Run::default(),
                    in_text: false,
                });
            }
        } else if name == b"pStyle" && depth == pd + 2 && stack[pd + 1] == b"pPr" {
            paragraph.paragraph.style = xml::attr(element, b"val")?;
        }
        return Ok(());
    };

    let rd = run.depth;
    if depth == rd + 1 {
        match name {
            b"t" if !empty => run.in_text = true,
            b"tab" => run.run.text.push('\t'),
            b"br" => match xml::attr(element, b"type")?.as_deref() {
                Some("page") => run.run.page_break = true,
                Some("column") => {}
                _ => run.run.text.push('\n'),
            },
            b"cr" => run.run.text.push('\n'),
            b"noBreakHyphen" => run.run.text.push('-'),
            _ => {}
        }
    } else if depth == rd + 2 && stack[rd + 1] == b"rPr" {
        let format = &mut run.run.format;
        match name {
            b"b" => format.bold = Some(xml::on_off(xml::attr(element, b"val")?.as_deref())),
            b"i" => format.italic = Some(xml::on_off(xml::attr(element, b"val")?.as_deref())),
            b"u" => {
                format.underline = Some(xml::attr(element, b"val")?.as_deref() != Some("none"))
            }
            _ => {}
        }
    }

    Ok(())
}
