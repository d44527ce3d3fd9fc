//! Merge orchestration.
//!
//! The [`Merger`] orders the inputs, picks an engine and runs it. It is the
//! only place that knows both engines.

use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::{Config, MergeOptions};
use crate::error::{DocxCatError, Result};
use crate::io::WriteStatistics;
use crate::io::writer::format_file_size;
use crate::merge::text::TextMerger;
use crate::merge::{Capabilities, EngineReport, MergeStrategy};
use crate::validation::Validator;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of documents merged.
    pub files_merged: usize,

    /// Body paragraphs taken from the sources.
    pub paragraphs: usize,

    /// Headings inserted before sources.
    pub headings: usize,

    /// Page breaks inserted between sources.
    pub page_breaks: usize,

    /// Package parts copied from appended sources (full merge only).
    pub parts_copied: usize,

    /// Total size of input files.
    pub input_size: u64,

    /// Size of the written document; 0 for a dry run.
    pub output_size: u64,

    /// Total time taken for the merge.
    #[serde(rename = "mergeTimeMs", serialize_with = "serialize_millis")]
    pub merge_time: Duration,
}

impl MergeStatistics {
    fn from_report(files_merged: usize, report: EngineReport) -> Self {
        Self {
            files_merged,
            paragraphs: report.paragraphs,
            headings: report.headings,
            page_breaks: report.page_breaks,
            parts_copied: report.parts_copied,
            input_size: report.input_size,
            ..Default::default()
        }
    }

    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of a merge operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// Path of the output document.
    pub output: PathBuf,

    /// Engine that built the output.
    pub strategy: MergeStrategy,

    /// Merged documents, in output order.
    pub merged_files: Vec<PathBuf>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Nothing was written.
    pub dry_run: bool,
}

/// Orders source documents and runs the right merge engine.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    capabilities: Capabilities,
    validator: Validator,
}

impl Merger {
    /// Create a merger for the given engine capabilities.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            validator: Validator::new(),
        }
    }

    /// Engine capabilities this merger was created with.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Merge the documents of `config` into its output.
    ///
    /// A sorted copy of the inputs drives the merge; `config.inputs` keeps
    /// its collection order and the merge order is reported in
    /// [`MergeResult::merged_files`]. A full merge is used when it is requested and
    /// available; otherwise the text-only merge runs without complaint.
    ///
    /// With `config.dry_run` every source is opened and checked but nothing
    /// is written.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::NoFilesToMerge`] when there are no inputs; no engine
    ///   runs in that case
    /// - the first error of the engine, unchanged
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use docxcat::merge::{Capabilities, Merger};
    /// # use docxcat::config::Config;
    /// # fn example(config: Config) -> docxcat::Result<()> {
    /// let merger = Merger::new(Capabilities::detect());
    /// let result = merger.merge(&config)?;
    /// println!("{} paragraphs with the {} merge",
    ///          result.statistics.paragraphs,
    ///          result.strategy);
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(&self, config: &Config) -> Result<MergeResult> {
        let start = Instant::now();

        let mut files = config.inputs.clone();
        files.sort(config.sort);
        if files.is_empty() {
            return Err(DocxCatError::NoFilesToMerge);
        }
        let files = files.as_slice();

        let strategy = MergeStrategy::select(config.options.use_full_merge, self.capabilities);
        if config.options.use_full_merge && strategy == MergeStrategy::TextOnly {
            tracing::debug!("full merge is not available, using the text-only merge");
        }
        tracing::debug!(
            files = files.len(),
            sort = %config.sort,
            strategy = %strategy,
            "merging"
        );

        let mut statistics = if config.dry_run {
            self.plan(files, &config.options, strategy)?
        } else {
            let (report, written) = self.run(strategy, files, &config.options, &config.output)?;
            let mut statistics = MergeStatistics::from_report(files.len(), report);
            statistics.output_size = written.file_size;
            statistics
        };
        statistics.merge_time = start.elapsed();

        tracing::info!(
            files = statistics.files_merged,
            paragraphs = statistics.paragraphs,
            dry_run = config.dry_run,
            elapsed_ms = statistics.merge_time.as_millis() as u64,
            "merge finished"
        );

        Ok(MergeResult {
            output: config.output.clone(),
            strategy,
            merged_files: files.to_vec(),
            statistics,
            dry_run: config.dry_run,
        })
    }

    /// Open every source and predict what a merge would insert.
    fn plan(
        &self,
        files: &[PathBuf],
        options: &MergeOptions,
        strategy: MergeStrategy,
    ) -> Result<MergeStatistics> {
        let summary = self.validator.validate_files(files)?;
        let text_only = strategy == MergeStrategy::TextOnly;

        Ok(MergeStatistics {
            files_merged: summary.files_validated,
            paragraphs: summary.total_paragraphs,
            headings: if text_only && options.add_headings {
                files.len()
            } else {
                0
            },
            page_breaks: if text_only && options.insert_breaks {
                files.len() - 1
            } else {
                0
            },
            input_size: summary.total_size,
            ..Default::default()
        })
    }

    fn run(
        &self,
        strategy: MergeStrategy,
        files: &[PathBuf],
        options: &MergeOptions,
        output: &Path,
    ) -> Result<(EngineReport, WriteStatistics)> {
        match strategy {
            MergeStrategy::TextOnly => TextMerger::new().merge(files, options, output),
            MergeStrategy::Full => self.compose(files, options, output),
        }
    }

    #[cfg(feature = "compose")]
    fn compose(
        &self,
        files: &[PathBuf],
        _options: &MergeOptions,
        output: &Path,
    ) -> Result<(EngineReport, WriteStatistics)> {
        crate::merge::compose::Composer::new().merge(files, output)
    }

    #[cfg(not(feature = "compose"))]
    fn compose(
        &self,
        files: &[PathBuf],
        options: &MergeOptions,
        output: &Path,
    ) -> Result<(EngineReport, WriteStatistics)> {
        tracing::warn!("built without the compose feature, using the text-only merge");
        TextMerger::new().merge(files, options, output)
    }
}
