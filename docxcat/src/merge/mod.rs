//! Document merging.
//!
//! Two engines build the output document:
//!
//! - [`text::TextMerger`] copies paragraph text and basic run formatting
//! - `compose::Composer` splices whole bodies with everything they reference
//!   (only with the `compose` feature)
//!
//! [`merger::Merger`] picks one of them for a [`Config`] and reports what
//! happened.

#[cfg(feature = "compose")]
pub mod compose;
pub mod merger;
pub mod text;

use std::fmt;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;

pub use merger::{MergeResult, MergeStatistics, Merger};

/// Counters reported by a merge engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineReport {
    /// Body paragraphs taken from the sources.
    pub paragraphs: usize,

    /// Headings inserted before sources.
    pub headings: usize,

    /// Page breaks inserted between sources.
    pub page_breaks: usize,

    /// Total size of the sources in bytes.
    pub input_size: u64,

    /// Package parts copied from appended sources.
    pub parts_copied: usize,
}

/// Optional engines available in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The full-fidelity engine can be used.
    pub full_merge: bool,
}

impl Capabilities {
    /// Capabilities of the running build.
    pub fn detect() -> Self {
        Self {
            full_merge: cfg!(feature = "compose"),
        }
    }

    /// Capabilities with only the text-only engine.
    pub fn text_only() -> Self {
        Self { full_merge: false }
    }
}

/// Engine used for a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Paragraph text and run flags only.
    TextOnly,
    /// Whole bodies with their related parts.
    Full,
}

impl MergeStrategy {
    /// Strategy to use for the requested options and available engines.
    pub fn select(use_full_merge: bool, capabilities: Capabilities) -> Self {
        if use_full_merge && capabilities.full_merge {
            Self::Full
        } else {
            Self::TextOnly
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextOnly => f.write_str("text-only"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// Merge the documents named by `config` with every engine this build has.
///
/// # Errors
///
/// Returns the first error of the merge unchanged; see [`Merger::merge`].
///
/// # Examples
///
/// ```no_run
/// use docxcat::config::Config;
/// use docxcat::merge;
///
/// # fn example() -> docxcat::Result<()> {
/// let config = Config::new(["1-intro.docx", "2-body.docx"], "book.docx");
/// let result = merge::merge_documents(&config)?;
/// println!("merged {} files", result.merged_files.len());
/// # Ok(())
/// # }
/// ```
pub fn merge_documents(config: &Config) -> Result<MergeResult> {
    Merger::new(Capabilities::detect()).merge(config)
}
