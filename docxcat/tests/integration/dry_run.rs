//! Integration tests for dry-run functionality.

use docxcat::error::DocxCatError;
use docxcat::merge::merge_documents;
use docxcat::validation::Validator;

use crate::common::{quiet_config, temp_dir, write_docx};

#[test]
fn test_dry_run_does_not_create_output() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["one", "two"]);
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a], &output);
    config.dry_run = true;

    let summary = Validator::new().validate_config(&config).unwrap();
    assert_eq!(summary.total_paragraphs, 2);

    let result = merge_documents(&config).unwrap();
    assert!(result.dry_run);
    assert_eq!(result.statistics.paragraphs, 2);
    assert!(!output.exists(), "Output file should not be created in dry run");
}

#[test]
fn test_dry_run_validates_all_inputs() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);
    let broken = dir.path().join("b.docx");
    std::fs::write(&broken, b"definitely not a zip").unwrap();
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a, broken.clone()], &output);
    config.dry_run = true;

    match merge_documents(&config).unwrap_err() {
        DocxCatError::DocumentFormat { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_dry_run_reports_merge_order() {
    let dir = temp_dir();
    let ten = write_docx(&dir, "10.docx", &["ten"]);
    let two = write_docx(&dir, "2.docx", &["two"]);
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[ten.clone(), two.clone()], &output);
    config.dry_run = true;
    let result = merge_documents(&config).unwrap();

    assert_eq!(result.merged_files, vec![two, ten]);
}
