//! Integration tests for error handling.

use std::path::PathBuf;

use docxcat::config::{Config, OverwriteMode};
use docxcat::error::DocxCatError;
use docxcat::merge::merge_documents;
use docxcat::validation::Validator;

use crate::common::{quiet_config, temp_dir, texts, write_docx};

#[test]
fn test_missing_input() {
    let dir = temp_dir();
    let output = dir.path().join("out.docx");
    let missing = dir.path().join("missing.docx");

    let err = merge_documents(&quiet_config(&[missing], &output)).unwrap_err();

    assert!(matches!(err, DocxCatError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn test_not_a_document() {
    let dir = temp_dir();
    let bogus = dir.path().join("bogus.docx");
    std::fs::write(&bogus, b"plain text pretending to be a document").unwrap();
    let output = dir.path().join("out.docx");

    let err = merge_documents(&quiet_config(&[bogus], &output)).unwrap_err();

    assert!(err.is_format_error());
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_failure_leaves_existing_output_untouched() {
    let dir = temp_dir();
    let a = write_docx(&dir, "1-a.docx", &["a"]);
    let broken = dir.path().join("2-broken.docx");
    std::fs::write(&broken, b"broken").unwrap();
    let output = write_docx(&dir, "out.docx", &["previous"]);

    let err = merge_documents(&quiet_config(&[a, broken.clone()], &output)).unwrap_err();

    match err {
        DocxCatError::DocumentFormat { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(texts(&output), vec!["previous"]);
}

#[test]
fn test_empty_input() {
    let dir = temp_dir();
    let output = dir.path().join("out.docx");
    let config = Config::new(Vec::<PathBuf>::new(), &output);

    let err = merge_documents(&config).unwrap_err();

    assert!(err.is_empty_input());
    assert!(!output.exists());
}

#[test]
fn test_no_clobber_refuses_existing_output() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);
    let output = write_docx(&dir, "out.docx", &["keep"]);

    let mut config = quiet_config(&[a], &output);
    config.overwrite_mode = OverwriteMode::NoClobber;

    let err = Validator::new().validate_config(&config).unwrap_err();
    assert!(matches!(err, DocxCatError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_output_is_a_directory() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);

    let config = quiet_config(&[a], dir.path());

    let err = Validator::new().validate_output(&config).unwrap_err();
    assert!(matches!(err, DocxCatError::NotAFile { .. }));
}

#[test]
fn test_missing_output_directory_is_created() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);
    let output = dir.path().join("nested").join("deeper").join("out.docx");

    merge_documents(&quiet_config(&[a], &output)).unwrap();

    assert_eq!(texts(&output), vec!["a"]);
}
