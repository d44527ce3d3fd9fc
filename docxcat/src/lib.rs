//! docxcat - Concatenate Word (`.docx`) documents into a single document.
//!
//! This library orders a set of source documents and merges them into one
//! output document. It supports:
//!
//! - Numeric-prefix, natural, lexical and as-given ordering
//! - A text-only merge that keeps paragraph text and bold/italic/underline
//! - A full merge (feature `compose`, on by default) that keeps tables,
//!   images, headers/footers, styles, lists and notes
//! - Optional per-document headings and page breaks (text-only merge)
//! - Atomic output writes
//!
//! # Examples
//!
//! ## Basic Merge
//!
//! ```no_run
//! use docxcat::merge;
//! use docxcat::config::{Config, SortPolicy};
//!
//! # fn example() -> docxcat::Result<()> {
//! let mut config = Config::new(["10-appendix.docx", "2-body.docx"], "book.docx");
//! config.sort = SortPolicy::NumericPrefix;
//! config.options.add_headings = true;
//! config.options.insert_breaks = true;
//!
//! let result = merge::merge_documents(&config)?;
//! println!("Merged {} paragraphs", result.statistics.paragraphs);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use docxcat::io::{OutputDocument, SourceDocument};
//! use std::path::Path;
//!
//! # fn example() -> docxcat::Result<()> {
//! let source = SourceDocument::open(Path::new("input.docx"))?;
//!
//! let mut output = OutputDocument::new();
//! output.add_heading(&source.base_name(), 1);
//! for paragraph in &source.paragraphs {
//!     output.add_paragraph(&paragraph.text());
//! }
//! output.save(Path::new("output.docx"))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod sort;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{DocxCatError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
