//! Document input/output.
//!
//! - [`package`]: the zip container and its parts
//! - [`relationships`] and [`content_types`]: the package bookkeeping parts
//! - [`reader`]: source documents reduced to paragraphs and runs
//! - [`writer`]: building output documents and saving packages atomically

pub mod content_types;
pub mod document;
pub mod package;
pub mod reader;
pub mod relationships;
pub mod writer;
pub mod xml;

pub use document::{Paragraph, Run, RunFormat};
pub use package::Package;
pub use reader::SourceDocument;
pub use writer::{DocxWriter, OutputDocument, WriteOptions, WriteStatistics};
