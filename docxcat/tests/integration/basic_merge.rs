//! Integration tests for the text-only merge.

use docxcat::merge::{MergeStrategy, merge_documents};

use crate::common::{
    formatted_run, paragraphs, quiet_config, table, temp_dir, texts, write_docx,
    write_docx_with_body,
};

#[test]
fn test_merge_two_documents() {
    let dir = temp_dir();
    let a = write_docx(&dir, "1-intro.docx", &["Hello", "World"]);
    let b = write_docx(&dir, "2-body.docx", &["Body"]);
    let output = dir.path().join("out.docx");

    let result = merge_documents(&quiet_config(&[a, b], &output)).unwrap();

    assert_eq!(result.strategy, MergeStrategy::TextOnly);
    assert_eq!(result.statistics.files_merged, 2);
    assert_eq!(result.statistics.paragraphs, 3);
    assert_eq!(texts(&output), vec!["Hello", "World", "Body"]);
}

#[test]
fn test_merge_single_document() {
    let dir = temp_dir();
    let a = write_docx(&dir, "only.docx", &["alone"]);
    let output = dir.path().join("out.docx");

    let result = merge_documents(&quiet_config(&[a], &output)).unwrap();

    assert_eq!(result.statistics.files_merged, 1);
    assert_eq!(texts(&output), vec!["alone"]);
}

#[test]
fn test_headings_and_page_breaks() {
    let dir = temp_dir();
    let a = write_docx(&dir, "1-a.docx", &["first"]);
    let b = write_docx(&dir, "2-b.docx", &["second"]);
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a, b], &output);
    config.options.add_headings = true;
    config.options.insert_breaks = true;
    let result = merge_documents(&config).unwrap();

    assert_eq!(result.statistics.headings, 2);
    assert_eq!(result.statistics.page_breaks, 1);

    let merged = paragraphs(&output);
    let texts: Vec<_> = merged.iter().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["1-a.docx", "", "first", "", "2-b.docx", "", "second"]);
    assert_eq!(merged[0].style.as_deref(), Some("Heading1"));
    assert_eq!(merged[4].style.as_deref(), Some("Heading1"));
    assert!(merged[3].has_page_break());
    assert_eq!(merged.iter().filter(|p| p.has_page_break()).count(), 1);
}

#[test]
fn test_no_trailing_page_break() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[a], &output);
    config.options.insert_breaks = true;
    let result = merge_documents(&config).unwrap();

    assert_eq!(result.statistics.page_breaks, 0);
    assert!(paragraphs(&output).iter().all(|p| !p.has_page_break()));
}

#[test]
fn test_run_formatting_is_kept() {
    let dir = temp_dir();
    let body = format!(
        "<w:p>{}{}{}{}</w:p>",
        formatted_run("bold", "<w:b/>"),
        formatted_run("not italic", "<w:i w:val=\"0\"/>"),
        formatted_run("underlined", "<w:u w:val=\"double\"/>"),
        "<w:r><w:t>plain</w:t></w:r>",
    );
    let a = write_docx_with_body(&dir, "styled.docx", &body);
    let output = dir.path().join("out.docx");

    merge_documents(&quiet_config(&[a], &output)).unwrap();

    let merged = paragraphs(&output);
    let runs = &merged[0].runs;
    assert_eq!(runs.len(), 4);
    assert_eq!(runs[0].format.bold, Some(true));
    assert_eq!(runs[0].format.italic, None);
    assert_eq!(runs[1].format.italic, Some(false));
    assert_eq!(runs[2].format.underline, Some(true));
    assert!(runs[3].format.is_unset());
    assert_eq!(merged[0].text(), "boldnot italicunderlinedplain");
}

#[test]
fn test_tables_are_dropped() {
    let dir = temp_dir();
    let body = format!(
        "<w:p><w:r><w:t>before</w:t></w:r></w:p>{}<w:p><w:r><w:t>after</w:t></w:r></w:p>",
        table("cell")
    );
    let a = write_docx_with_body(&dir, "table.docx", &body);
    let output = dir.path().join("out.docx");

    merge_documents(&quiet_config(&[a], &output)).unwrap();

    assert_eq!(texts(&output), vec!["before", "after"]);
}

#[test]
fn test_empty_paragraphs_are_kept() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["one", "", "two"]);
    let output = dir.path().join("out.docx");

    merge_documents(&quiet_config(&[a], &output)).unwrap();

    assert_eq!(texts(&output), vec!["one", "", "two"]);
}
