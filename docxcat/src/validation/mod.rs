//! Input validation for docxcat.
//!
//! Checks source documents and the output path before a merge:
//! - File existence and accessibility
//! - `.docx` package and main document validity
//! - Paragraph and run counts
//! - Output overwrite policy
//!
//! # Examples
//!
//! ```no_run
//! use docxcat::validation::Validator;
//! use std::path::Path;
//!
//! # fn example() -> docxcat::Result<()> {
//! let validator = Validator::new();
//! let result = validator.validate_file(Path::new("chapter1.docx"))?;
//! println!("{} paragraphs", result.paragraph_count);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{Config, OverwriteMode};
use crate::error::{DocxCatError, Result};
use crate::io::SourceDocument;
use crate::io::writer::format_file_size;

/// Result of validating a single source document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Path to the validated file.
    pub path: PathBuf,

    /// Number of body paragraphs.
    pub paragraph_count: usize,

    /// Number of runs across all body paragraphs.
    pub run_count: usize,

    /// Size of the file in bytes.
    pub file_size: u64,
}

impl ValidationResult {
    fn from_document(doc: &SourceDocument) -> Self {
        Self {
            path: doc.path.clone(),
            paragraph_count: doc.paragraph_count(),
            run_count: doc.run_count(),
            file_size: doc.file_size,
        }
    }
}

/// Summary of validation results for multiple files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Individual validation results, in input order.
    pub results: Vec<ValidationResult>,

    /// Total number of paragraphs across all files.
    pub total_paragraphs: usize,

    /// Total file size in bytes.
    pub total_size: u64,

    /// Number of files that passed validation.
    pub files_validated: usize,
}

impl ValidationSummary {
    /// Create a summary from validation results.
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let total_paragraphs = results.iter().map(|r| r.paragraph_count).sum();
        let total_size = results.iter().map(|r| r.file_size).sum();
        let files_validated = results.len();

        Self {
            results,
            total_paragraphs,
            total_size,
            files_validated,
        }
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Validator for source documents and output paths.
#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a single source document.
    ///
    /// The document is opened and parsed the same way the text-only merge
    /// reads it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or is a directory
    /// - The file is empty
    /// - The file is not a readable `.docx` package
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult> {
        if !path.exists() {
            return Err(DocxCatError::file_not_found(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(DocxCatError::not_a_file(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| DocxCatError::FileNotAccessible {
            path: path.to_path_buf(),
            source: e,
        })?;
        if metadata.len() == 0 {
            return Err(DocxCatError::document_format(
                path.to_path_buf(),
                "File is empty",
            ));
        }

        let doc = SourceDocument::open(path)?;
        tracing::debug!(
            path = %path.display(),
            paragraphs = doc.paragraph_count(),
            "validated"
        );
        Ok(ValidationResult::from_document(&doc))
    }

    /// Validate every file in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::NoFilesToMerge`] when `paths` is empty
    /// - the first error from [`Validator::validate_file`]
    pub fn validate_files(&self, paths: &[PathBuf]) -> Result<ValidationSummary> {
        if paths.is_empty() {
            return Err(DocxCatError::NoFilesToMerge);
        }

        let results = paths
            .iter()
            .map(|path| self.validate_file(path))
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidationSummary::from_results(results))
    }

    /// Validate the output path against the overwrite mode.
    ///
    /// An existing output with [`OverwriteMode::Prompt`] passes; asking the
    /// user is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output file exists and no-clobber is set
    /// - Output path is an existing directory
    pub fn validate_output(&self, config: &Config) -> Result<()> {
        let output = &config.output;

        if output.is_dir() {
            return Err(DocxCatError::not_a_file(output.clone()));
        }

        if output.exists() && config.overwrite_mode == OverwriteMode::NoClobber {
            return Err(DocxCatError::output_exists(output.clone()));
        }

        Ok(())
    }

    /// Validate every input and the output of `config`.
    pub fn validate_config(&self, config: &Config) -> Result<ValidationSummary> {
        let summary = self.validate_files(config.inputs.as_slice())?;
        self.validate_output(config)?;
        Ok(summary)
    }
}
