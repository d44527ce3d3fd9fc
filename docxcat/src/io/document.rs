//! Paragraph and run model shared by the reader, the writer and the text
//! merge engine.

use serde::Serialize;

/// Character formatting flags of a run.
///
/// Each flag is tri-state: `Some(true)` and `Some(false)` are explicit,
/// `None` means the run inherits the value from its style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunFormat {
    /// Bold (`w:b`).
    pub bold: Option<bool>,
    /// Italic (`w:i`).
    pub italic: Option<bool>,
    /// Underline (`w:u`); any underline style counts as `true`.
    pub underline: Option<bool>,
}

impl RunFormat {
    /// True when no flag is set.
    pub fn is_unset(&self) -> bool {
        self.bold.is_none() && self.italic.is_none() && self.underline.is_none()
    }
}

/// A span of text sharing one set of formatting flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Run {
    /// Text content. Tabs are `\t`, line breaks `\n`.
    pub text: String,
    /// Formatting flags.
    pub format: RunFormat,
    /// The run contains a hard page break.
    pub page_break: bool,
}

impl Run {
    /// Create an unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the bold flag.
    pub fn bold(&mut self, value: Option<bool>) -> &mut Self {
        self.format.bold = value;
        self
    }

    /// Set the italic flag.
    pub fn italic(&mut self, value: Option<bool>) -> &mut Self {
        self.format.italic = value;
        self
    }

    /// Set the underline flag.
    pub fn underline(&mut self, value: Option<bool>) -> &mut Self {
        self.format.underline = value;
        self
    }
}

/// A body paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Paragraph style id (`w:pStyle`), if any.
    pub style: Option<String>,
    /// Runs in document order.
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a paragraph holding `text` as a single run.
    ///
    /// Empty text gives a paragraph without runs.
    pub fn new(text: &str) -> Self {
        let mut paragraph = Self::default();
        if !text.is_empty() {
            paragraph.add_run(text);
        }
        paragraph
    }

    /// Append a run and return it so its flags can be set.
    pub fn add_run(&mut self, text: impl Into<String>) -> &mut Run {
        self.runs.push(Run::new(text));
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// True when any run carries a page break.
    pub fn has_page_break(&self) -> bool {
        self.runs.iter().any(|run| run.page_break)
    }
}
