//! CLI argument parsing for docxcat.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use docxcat::config::{Config, FileSet, OverwriteMode, SortPolicy};
use docxcat::error::{DocxCatError, Result};
use docxcat::utils;

/// Concatenate Word documents into a single document.
///
/// docxcat orders the given .docx files by name and merges them into one
/// document, either keeping only text with bold/italic/underline or, with
/// --full, keeping tables, images, headers and footers as well.
#[derive(Parser, Debug)]
#[command(name = "docxcat")]
#[command(version)]
#[command(about = "Concatenate Word (.docx) documents into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input documents, directories or glob patterns
    ///
    /// Directories contribute the .docx files directly inside them
    /// (subdirectories and Word lock files are skipped). The collected
    /// documents are ordered with --sort before merging.
    ///
    /// Examples:
    ///   docxcat chapters/ -o book.docx
    ///   docxcat 'part-*.docx' -o all.docx
    #[arg(value_name = "INPUT", required_unless_present = "input_list")]
    pub inputs: Vec<PathBuf>,

    /// Output document path
    ///
    /// The merged document is written to a temporary file next to this
    /// path and renamed into place when complete.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Read additional inputs from a file (one path per line)
    ///
    /// Lines starting with '#' and blank lines are ignored. Paths from the
    /// list are added after the direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Insert a heading with the file name before each document
    #[arg(long)]
    pub headings: bool,

    /// Insert a page break between documents
    #[arg(long)]
    pub page_breaks: bool,

    /// Keep all formatting, tables, images, headers and footers
    ///
    /// Falls back to the text-only merge when this build lacks the full
    /// merge engine. --headings and --page-breaks do not apply to a full
    /// merge.
    #[arg(long)]
    pub full: bool,

    /// Order of the merged documents
    ///
    /// - numeric-prefix: names starting with a number first, by that number
    /// - natural: digit runs compare as numbers (item2 before item10)
    /// - lexical: plain byte-wise order of file names
    /// - as-given: keep the order of the command line
    #[arg(long, value_name = "POLICY", default_value = "numeric-prefix")]
    #[arg(value_parser = ["numeric-prefix", "natural", "lexical", "as-given"])]
    pub sort: String,

    /// Dry run - check inputs and show the merge order without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show per-document details and statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Print a JSON summary on stdout instead of the human-readable report
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments and the collected inputs into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the sort policy is unknown or configuration
    /// validation fails.
    pub fn to_config(&self, inputs: FileSet) -> Result<Config> {
        let sort = SortPolicy::from_str(&self.sort)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let mut config = Config::new(Vec::<PathBuf>::new(), self.output.clone());
        config.inputs = inputs;
        config.sort = sort;
        config.options.add_headings = self.headings;
        config.options.insert_breaks = self.page_breaks;
        config.options.use_full_merge = self.full;
        config.dry_run = self.dry_run;
        config.verbose = self.verbose;
        config.quiet = self.quiet;
        config.overwrite_mode = overwrite_mode;
        config.json = self.json;

        config.validate().map_err(|e| match e.downcast::<DocxCatError>() {
            Ok(err) => err,
            Err(e) => DocxCatError::invalid_config(format!("Configuration validation failed: {e}")),
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if no inputs and no input list are given, or the
    /// sort policy is unknown.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(DocxCatError::invalid_config("No input files specified"));
        }

        SortPolicy::from_str(&self.sort)?;

        Ok(())
    }

    /// Collect every input document.
    ///
    /// Direct inputs are expanded first (directories and glob patterns),
    /// then the paths from --input-list are appended. Duplicates are
    /// dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid, a directory cannot be
    /// read, the input list cannot be read, or nothing was collected.
    pub fn get_all_inputs(&self) -> Result<FileSet> {
        let mut all_inputs = utils::collect_inputs(&self.inputs)?;

        if let Some(ref input_list_path) = self.input_list {
            let listed = utils::read_input_list(input_list_path)?;
            all_inputs.extend(utils::collect_inputs(&listed)?);
        }

        if all_inputs.is_empty() {
            return Err(DocxCatError::NoFilesToMerge);
        }

        Ok(all_inputs)
    }
}
