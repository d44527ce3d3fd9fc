//! Output formatting and display for docxcat.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - Validation and merge summaries
//! - The machine-readable JSON summary
//! - Quiet and verbose modes
//!
//! Diagnostics for developers go through `tracing` instead.
//!
//! # Examples
//!
//! ```no_run
//! use docxcat::output::OutputFormatter;
//! use docxcat::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge operation");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::error::{DocxCatError, Result};
use crate::io::reader::base_name;
use crate::merge::{MergeResult, MergeStrategy};
use crate::validation::ValidationSummary;

/// Display validation summary to the user.
///
/// In verbose mode every document is listed with its paragraph count.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    formatter.info(&format!(
        "Validated {} file(s): {} paragraphs, {}",
        summary.files_validated,
        summary.total_paragraphs,
        summary.format_total_size()
    ));

    if formatter.is_verbose() {
        for result in &summary.results {
            formatter.debug(&format!(
                "{}: {} paragraphs, {} runs",
                result.path.display(),
                result.paragraph_count,
                result.run_count
            ));
        }
    }
}

/// Display the outcome of a merge to the user.
pub fn display_merge_result(formatter: &OutputFormatter, result: &MergeResult) {
    if !formatter.should_print() {
        return;
    }

    formatter.section("Merge order");
    for (index, path) in result.merged_files.iter().enumerate() {
        formatter.list_item(index + 1, &base_name(path));
    }
    formatter.blank_line();

    let stats = &result.statistics;
    if result.dry_run {
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", result.output.display()));
        formatter.info("  Run without --dry-run to create the merged document");
    } else {
        formatter.success(&format!(
            "Created {} from {} document(s) ({})",
            result.output.display(),
            stats.files_merged,
            stats.format_output_size()
        ));
    }

    if formatter.is_verbose() {
        formatter.section("Statistics");
        formatter.detail("Strategy", &result.strategy.to_string());
        formatter.detail("Input files", &stats.files_merged.to_string());
        formatter.detail("Paragraphs", &stats.paragraphs.to_string());
        formatter.detail("Headings", &stats.headings.to_string());
        formatter.detail("Page breaks", &stats.page_breaks.to_string());
        if result.strategy == MergeStrategy::Full {
            formatter.detail("Parts copied", &stats.parts_copied.to_string());
        }
        formatter.detail("Input size", &stats.format_input_size());
        formatter.detail(
            "Merge time",
            &format!("{:.2}s", stats.merge_time.as_secs_f64()),
        );
    }
}

/// Render the merge result as pretty-printed JSON.
pub fn json_summary(result: &MergeResult) -> Result<String> {
    serde_json::to_string_pretty(result)
        .map_err(|e| DocxCatError::other(format!("Failed to serialize summary: {e}")))
}
