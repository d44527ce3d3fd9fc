//! docxcat - Concatenate Word documents into a single document.
//!
//! Orders `.docx` files by name and merges them, text-only or with full
//! formatting.

mod cli;

use clap::Parser;
use std::process;

use crate::cli::Cli;
use docxcat::config::Config;
use docxcat::error::DocxCatError;
use docxcat::merge::{Capabilities, Merger};
use docxcat::output::{
    OutputFormatter, display_merge_result, display_validation_summary, json_summary,
};
use docxcat::validation::Validator;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(&cli);

    // Run the application and handle errors
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Route diagnostics to stderr at a level picked by -v/-q.
fn init_tracing(cli: &Cli) {
    let level = if cli.quiet || cli.json {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Main application logic.
fn run(cli: Cli) -> Result<(), DocxCatError> {
    // Validate CLI arguments
    cli.validate()?;

    // Get all inputs (including from input-list if specified)
    let all_inputs = cli.get_all_inputs()?;
    let config = cli.to_config(all_inputs)?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", docxcat::NAME, docxcat::VERSION));
        formatter.blank_line();
    }

    // Validate configuration and inputs
    formatter.info("Validating input files...");
    let validator = Validator::new();
    let validation_summary = validator.validate_config(&config)?;

    if formatter.should_print() {
        display_validation_summary(&formatter, &validation_summary);
        formatter.blank_line();
    }

    // Handle output file existence
    if !config.dry_run {
        handle_output_overwrite(&config, &formatter)?;
        formatter.info("Merging documents...");
    }

    let merger = Merger::new(Capabilities::detect());
    if config.options.use_full_merge && !merger.capabilities().full_merge {
        formatter.warning("Full merge is not available in this build, using text-only merge");
    }
    let result = merger.merge(&config)?;

    if config.json {
        println!("{}", json_summary(&result)?);
    } else {
        display_merge_result(&formatter, &result);
    }

    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), DocxCatError> {
    use docxcat::config::OverwriteMode;

    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(DocxCatError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet mode
            if formatter.is_quiet() {
                return Err(DocxCatError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| DocxCatError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(DocxCatError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docxcat::config::OverwriteMode;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn create_test_config() -> Config {
        let mut config = Config::new(["test.docx"], "/nonexistent/output.docx");
        config.overwrite_mode = OverwriteMode::Force;
        config
    }

    #[test]
    fn test_handle_output_overwrite_force() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = create_test_config();
        config.output = temp_file.path().to_path_buf();

        let result = handle_output_overwrite(&config, &OutputFormatter::quiet());
        assert!(result.is_ok());
    }

    #[test]
    fn test_handle_output_overwrite_no_clobber() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = create_test_config();
        config.overwrite_mode = OverwriteMode::NoClobber;
        config.output = temp_file.path().to_path_buf();

        let err = handle_output_overwrite(&config, &OutputFormatter::quiet()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_handle_output_overwrite_prompt_when_quiet() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = create_test_config();
        config.overwrite_mode = OverwriteMode::Prompt;
        config.output = temp_file.path().to_path_buf();

        let result = handle_output_overwrite(&config, &OutputFormatter::quiet());
        assert!(matches!(result, Err(DocxCatError::OutputExists { .. })));
    }

    #[test]
    fn test_handle_output_overwrite_nonexistent() {
        let mut config = create_test_config();
        config.overwrite_mode = OverwriteMode::NoClobber;
        config.output = PathBuf::from("/nonexistent/output.docx");

        let result = handle_output_overwrite(&config, &OutputFormatter::quiet());
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_reports_missing_input() {
        let cli = Cli::try_parse_from([
            "docxcat",
            "-q",
            "-o",
            "/nonexistent/out.docx",
            "/nonexistent/in.docx",
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        assert!(matches!(err, DocxCatError::FileNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
