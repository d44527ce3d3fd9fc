//! Error types for docxcat.
//!
//! This module defines all error types that can occur while collecting,
//! reading, merging and writing documents. Errors carry the path they relate
//! to so that the caller can present them without further context.
//!
//! # Error Categories
//!
//! - **Empty input**: nothing to merge
//! - **Document format errors**: the file is not a readable `.docx` package
//! - **I/O errors**: file not found, permission denied, write failures
//! - **Configuration errors**: invalid arguments or input lists

use std::io;
use std::path::PathBuf;

/// Result type alias for docxcat operations.
pub type Result<T> = std::result::Result<T, DocxCatError>;

/// Main error type for docxcat operations.
#[derive(Debug, thiserror::Error)]
pub enum DocxCatError {
    /// No files were provided for merging.
    #[error("No input files specified for merging")]
    NoFilesToMerge,

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// File is not a readable document of the expected format.
    #[error("Not a valid .docx document: {}\n  Reason: {reason}", path.display())]
    DocumentFormat {
        /// Path to the offending document.
        path: PathBuf,
        /// What the document layer reported.
        reason: String,
    },

    /// A package part required to read the document is missing.
    #[error("Document {} is missing required part '{part}'", path.display())]
    MissingPart {
        /// Path to the document.
        path: PathBuf,
        /// Name of the missing part inside the package.
        part: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains invalid entries.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<zip::result::ZipError> for DocxCatError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => Self::Io { source },
            other => Self::other(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for DocxCatError {
    fn from(err: quick_xml::Error) -> Self {
        Self::other(format!("XML error: {err}"))
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxCatError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::other(format!("XML attribute error: {err}"))
    }
}

impl From<quick_xml::escape::EscapeError> for DocxCatError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Self::other(format!("XML escape error: {err}"))
    }
}

impl From<anyhow::Error> for DocxCatError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DocxCatError>() {
            Ok(err) => err,
            Err(err) => Self::invalid_config(err.to_string()),
        }
    }
}

impl DocxCatError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a DocumentFormat error.
    pub fn document_format(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::DocumentFormat {
            path,
            reason: reason.into(),
        }
    }

    /// Create a MissingPart error.
    pub fn missing_part(path: PathBuf, part: impl Into<String>) -> Self {
        Self::MissingPart {
            path,
            part: part.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Attach a document path to a low-level failure raised while parsing it.
    ///
    /// Errors that already name a path are returned unchanged; generic
    /// errors become [`DocxCatError::DocumentFormat`] for `path`.
    pub fn in_document(self, path: &std::path::Path) -> Self {
        match self {
            Self::Other { message } => Self::document_format(path.to_path_buf(), message),
            Self::Io { source } => Self::FileNotAccessible {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    /// True when there was nothing to merge.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::NoFilesToMerge)
    }

    /// True when a source did not parse as a `.docx` document.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::DocumentFormat { .. } | Self::MissingPart { .. })
    }

    /// True for read or write failures at the storage layer.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::FileNotAccessible { .. }
                | Self::NotAFile { .. }
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Io { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoFilesToMerge => 1,
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::DocumentFormat { .. } => 3,
            Self::MissingPart { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
