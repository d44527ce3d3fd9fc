//! Integration tests for the full merge.

use docxcat::merge::{MergeStrategy, merge_documents};

use crate::common::{main_xml, quiet_config, table, temp_dir, texts, write_docx_with_body};

#[test]
fn test_full_merge_keeps_tables() {
    let dir = temp_dir();
    let a = write_docx_with_body(
        &dir,
        "1-a.docx",
        &format!("<w:p><w:r><w:t>first</w:t></w:r></w:p>{}", table("cell a")),
    );
    let b = write_docx_with_body(
        &dir,
        "2-b.docx",
        &format!("{}<w:p><w:r><w:t>second</w:t></w:r></w:p>", table("cell b")),
    );
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a, b], &output);
    config.options.use_full_merge = true;
    let result = merge_documents(&config).unwrap();

    assert_eq!(result.strategy, MergeStrategy::Full);
    let xml = main_xml(&output);
    assert_eq!(xml.matches("<w:tbl>").count(), 2);
    assert!(xml.find("cell a") < xml.find("cell b"));

    let merged = texts(&output);
    assert_eq!(merged.first().map(String::as_str), Some("first"));
    assert_eq!(merged.last().map(String::as_str), Some("second"));
}

#[test]
fn test_full_merge_ignores_headings_and_breaks() {
    let dir = temp_dir();
    let a = write_docx_with_body(&dir, "a.docx", "<w:p><w:r><w:t>a</w:t></w:r></w:p>");
    let b = write_docx_with_body(&dir, "b.docx", "<w:p><w:r><w:t>b</w:t></w:r></w:p>");
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a, b], &output);
    config.options.use_full_merge = true;
    config.options.add_headings = true;
    config.options.insert_breaks = true;
    let result = merge_documents(&config).unwrap();

    assert_eq!(result.statistics.headings, 0);
    assert_eq!(result.statistics.page_breaks, 0);
    assert!(!texts(&output).iter().any(|text| text.ends_with(".docx")));
}

#[test]
fn test_full_merge_single_source_is_unchanged() {
    let dir = temp_dir();
    let a = write_docx_with_body(&dir, "a.docx", &table("only"));
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a.clone()], &output);
    config.options.use_full_merge = true;
    merge_documents(&config).unwrap();

    assert_eq!(main_xml(&output), main_xml(&a));
}
