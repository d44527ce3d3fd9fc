//! Text-only merge engine.
//!
//! Copies paragraph text and run-level bold/italic/underline flags of every
//! source into a fresh document. Tables, images, headers/footers, section
//! properties and page breaks inside the sources are not carried over.

use std::path::{Path, PathBuf};

use crate::config::MergeOptions;
use crate::error::{DocxCatError, Result};
use crate::io::{OutputDocument, SourceDocument, WriteStatistics};
use crate::merge::EngineReport;

/// Heading level used for per-source headings.
pub const SOURCE_HEADING_LEVEL: u8 = 1;

/// Builds a merged document from paragraph text and run flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMerger;

impl TextMerger {
    /// Create a text merger.
    pub fn new() -> Self {
        Self
    }

    /// Build the merged document in memory.
    ///
    /// Sources are opened one at a time, in order. The first source that
    /// fails to open aborts the build.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::NoFilesToMerge`] when `files` is empty
    /// - any error from [`SourceDocument::open`], unchanged
    pub fn build(
        &self,
        files: &[PathBuf],
        options: &MergeOptions,
    ) -> Result<(OutputDocument, EngineReport)> {
        if files.is_empty() {
            return Err(DocxCatError::NoFilesToMerge);
        }

        let mut output = OutputDocument::new();
        let mut report = EngineReport::default();
        let last = files.len() - 1;

        for (index, path) in files.iter().enumerate() {
            let source = SourceDocument::open(path)?;
            tracing::debug!(
                path = %path.display(),
                paragraphs = source.paragraph_count(),
                runs = source.run_count(),
                "copying text"
            );

            if options.add_headings {
                output.add_heading(&source.base_name(), SOURCE_HEADING_LEVEL);
                output.add_paragraph("");
                report.headings += 1;
            }

            append_source(&mut output, &source);
            report.paragraphs += source.paragraph_count();
            report.input_size += source.file_size;

            if options.insert_breaks && index < last {
                output.add_page_break();
                report.page_breaks += 1;
            }
        }

        Ok((output, report))
    }

    /// Build the merged document and save it to `output`.
    ///
    /// Nothing is written unless every source was read successfully.
    pub fn merge(
        &self,
        files: &[PathBuf],
        options: &MergeOptions,
        output: &Path,
    ) -> Result<(EngineReport, WriteStatistics)> {
        let (document, report) = self.build(files, options)?;
        let stats = document.save(output)?;
        Ok((report, stats))
    }
}

/// Copy every paragraph of `source`, run by run.
fn append_source(output: &mut OutputDocument, source: &SourceDocument) {
    for paragraph in &source.paragraphs {
        let target = output.add_paragraph("");
        for run in &paragraph.runs {
            target.add_run(run.text.as_str()).format = run.format;
        }
    }
}
