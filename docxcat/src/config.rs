//! Configuration module for docxcat.
//!
//! This module holds the validated, normalized configuration that drives a
//! merge. It handles:
//! - The ordered set of source documents
//! - Sort policy selection
//! - Merge options (headings, page breaks, full merge)
//! - Output overwrite behavior

use anyhow::{Result, bail};
use serde::Serialize;

use crate::DocxCatError;
use crate::sort;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// How the set of source documents is ordered before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortPolicy {
    /// Names starting with a number first, in numeric order; the rest after
    /// them in natural order.
    #[default]
    NumericPrefix,
    /// Digit runs compare as numbers, text case-insensitively.
    Natural,
    /// Plain byte-wise comparison of file names.
    Lexical,
    /// Keep the order in which the files were collected.
    AsGiven,
}

impl SortPolicy {
    /// All policies, in the order they are listed on the command line.
    pub const ALL: [SortPolicy; 4] = [
        Self::NumericPrefix,
        Self::Natural,
        Self::Lexical,
        Self::AsGiven,
    ];

    /// Command-line name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumericPrefix => "numeric-prefix",
            Self::Natural => "natural",
            Self::Lexical => "lexical",
            Self::AsGiven => "as-given",
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortPolicy {
    type Err = DocxCatError;

    /// Parse a sort policy from its command-line name.
    ///
    /// Accepts `numeric-prefix`, `natural`, `lexical` and `as-given`
    /// case-insensitively; underscores are accepted in place of dashes.
    fn from_str(s: &str) -> crate::Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| {
                DocxCatError::invalid_config(format!(
                    "Invalid sort policy: {s}. Must be one of: numeric-prefix, natural, lexical, as-given"
                ))
            })
    }
}

/// Options that shape the merged output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOptions {
    /// Insert a level-1 heading with the source file name before its content.
    pub add_headings: bool,
    /// Insert a page break after each source document except the last.
    pub insert_breaks: bool,
    /// Use the full-fidelity merge when the capability is available.
    pub use_full_merge: bool,
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Ordered set of source documents.
///
/// Paths are kept in insertion order until [`FileSet::sort`] is called.
/// Adding a path that is already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path, keeping the first occurrence of duplicates.
    ///
    /// Returns false if the path was already present.
    pub fn push(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Reorder the set in place according to `policy`.
    pub fn sort(&mut self, policy: SortPolicy) {
        sort::sort_paths(&mut self.paths, policy);
    }

    /// Number of documents in the set.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when there is nothing to merge.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate the paths in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Borrow the paths as a slice.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }

    /// True when `path` is part of the set.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for FileSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<P: Into<PathBuf>> Extend<P> for FileSet {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for path in iter {
            self.push(path);
        }
    }
}

impl IntoIterator for FileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Complete configuration for a merge operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source documents (sorted by the merger before use).
    pub inputs: FileSet,

    /// Output document path.
    pub output: PathBuf,

    /// Ordering applied to the inputs.
    pub sort: SortPolicy,

    /// Merge options.
    pub options: MergeOptions,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Print a machine-readable summary instead of the human one.
    pub json: bool,
}

impl Config {
    /// Create a configuration with default options.
    pub fn new(inputs: impl IntoIterator<Item = impl Into<PathBuf>>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            output: output.into(),
            sort: SortPolicy::default(),
            options: MergeOptions::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            json: false,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output does not have a `.docx` extension
    /// - The output is also one of the inputs, however the path is spelled
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!(DocxCatError::NoFilesToMerge);
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        let has_docx_extension = self
            .output
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if !has_docx_extension {
            bail!(
                "Output file must have a .docx extension: {}",
                self.output.display()
            );
        }

        if self.inputs.iter().any(|input| same_file(input, &self.output)) {
            bail!(
                "Output file cannot be the same as an input file: {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

/// True when `a` and `b` name the same file.
///
/// Paths are compared without `.` components; when both exist their
/// canonical forms decide.
fn same_file(a: &Path, b: &Path) -> bool {
    let lexical = |path: &Path| -> PathBuf {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    if lexical(a) == lexical(b) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
