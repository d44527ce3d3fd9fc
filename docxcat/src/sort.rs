//! Sort keys for ordering source documents by file name.
//!
//! Two key functions are provided:
//!
//! - [`natural_key`]: digit runs compare as numbers, everything else
//!   case-insensitively, so `item2` sorts before `item10`.
//! - [`numeric_prefix_key`]: names that start with a number (after optional
//!   whitespace) come first, ordered by that number; all other names follow
//!   in natural order.
//!
//! Both keys are total orders, so sorting is deterministic and idempotent.
//!
//! # Examples
//!
//! ```
//! use docxcat::sort::natural_key;
//!
//! assert!(natural_key("item2.docx") < natural_key("item10.docx"));
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::config::SortPolicy;

/// A maximal run of ASCII digits, compared by numeric value.
///
/// Values of any length are supported; no integer parsing takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitRun(String);

impl DigitRun {
    fn new(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The value with leading zeros removed.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for DigitRun {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for DigitRun {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One piece of a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    /// Lowercased non-digit text.
    Text(String),
    /// A digit run.
    Number(DigitRun),
}

/// Natural sort key: alternating text and number segments.
///
/// The key always starts with a (possibly empty) text segment, so two keys
/// never compare a number against text at the same position. Names whose
/// segments are all equal (`a01` and `a1`) are ordered by the raw name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey {
    segments: Vec<Segment>,
    raw: String,
}

impl NaturalKey {
    /// The segments making up this key.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Key for [`SortPolicy::NumericPrefix`].
///
/// Variant order matters: every prefixed name sorts before every plain one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrefixKey {
    /// Name starts with a number; ties break on the lowercased name.
    Prefixed {
        /// Value of the leading digit run.
        value: DigitRun,
        /// Lowercased full name.
        lowered: String,
        /// Original name, for a total order.
        raw: String,
    },
    /// No leading number; ordered naturally.
    Plain(NaturalKey),
}

/// Build the natural sort key of `name`.
pub fn natural_key(name: &str) -> NaturalKey {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = name;

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        text.push_str(&rest[..start]);
        let digits = &rest[start..];
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());

        segments.push(Segment::Text(std::mem::take(&mut text).to_lowercase()));
        segments.push(Segment::Number(DigitRun::new(&digits[..end])));
        rest = &digits[end..];
    }
    text.push_str(rest);
    segments.push(Segment::Text(text.to_lowercase()));

    NaturalKey {
        segments,
        raw: name.to_string(),
    }
}

/// Build the numeric-prefix sort key of `name`.
pub fn numeric_prefix_key(name: &str) -> PrefixKey {
    let trimmed = name.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    if end == 0 {
        return PrefixKey::Plain(natural_key(name));
    }

    PrefixKey::Prefixed {
        value: DigitRun::new(&trimmed[..end]),
        lowered: name.to_lowercase(),
        raw: name.to_string(),
    }
}

/// File name used for ordering: the final path component.
fn sort_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Sort `paths` in place by their file names under `policy`.
///
/// The sort is stable: paths with equal keys keep their relative order.
pub fn sort_paths(paths: &mut [PathBuf], policy: SortPolicy) {
    match policy {
        SortPolicy::NumericPrefix => {
            paths.sort_by_cached_key(|path| numeric_prefix_key(&sort_name(path)))
        }
        SortPolicy::Natural => paths.sort_by_cached_key(|path| natural_key(&sort_name(path))),
        SortPolicy::Lexical => paths.sort_by_cached_key(|path| sort_name(path)),
        SortPolicy::AsGiven => {}
    }
}
