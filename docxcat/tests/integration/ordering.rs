//! Integration tests for input collection and ordering.

use docxcat::config::SortPolicy;
use docxcat::merge::merge_documents;
use docxcat::utils::collect_inputs;
use rstest::rstest;

use crate::common::{quiet_config, temp_dir, texts, write_docx};

#[test]
fn test_directory_input_in_numeric_prefix_order() {
    let dir = temp_dir();
    let sources = dir.path().join("chapters");
    std::fs::create_dir(&sources).unwrap();
    let chapters = tempfile::TempDir::new_in(&sources).unwrap();
    for (name, text) in [
        ("10-end.docx", "end"),
        ("2-middle.docx", "middle"),
        ("appendix.docx", "appendix"),
        ("1-start.docx", "start"),
    ] {
        write_docx(&chapters, name, &[text]);
    }
    std::fs::write(chapters.path().join("~$1-start.docx"), b"lock").unwrap();
    std::fs::write(chapters.path().join("notes.txt"), b"notes").unwrap();

    let inputs = collect_inputs([chapters.path()]).unwrap();
    assert_eq!(inputs.len(), 4);

    let output = dir.path().join("book.docx");
    let mut config = quiet_config(inputs.as_slice(), &output);
    config.sort = SortPolicy::NumericPrefix;
    let result = merge_documents(&config).unwrap();

    assert_eq!(texts(&output), vec!["start", "middle", "end", "appendix"]);
    assert_eq!(result.merged_files.len(), 4);
}

#[rstest]
#[case(SortPolicy::Natural, vec!["two", "ten"])]
#[case(SortPolicy::Lexical, vec!["ten", "two"])]
#[case(SortPolicy::AsGiven, vec!["ten", "two"])]
fn test_sort_policies(#[case] policy: SortPolicy, #[case] expected: Vec<&str>) {
    let dir = temp_dir();
    let ten = write_docx(&dir, "item10.docx", &["ten"]);
    let two = write_docx(&dir, "item2.docx", &["two"]);
    let output = dir.path().join("out.docx");

    let mut config = quiet_config(&[ten, two], &output);
    config.sort = policy;
    merge_documents(&config).unwrap();

    assert_eq!(texts(&output), expected);
}

#[test]
fn test_equal_numbers_fall_back_to_names() {
    let dir = temp_dir();
    let b = write_docx(&dir, "01-b.docx", &["b"]);
    let a = write_docx(&dir, "1-a.docx", &["a"]);
    let output = dir.path().join("out.docx");

    merge_documents(&quiet_config(&[b, a], &output)).unwrap();

    let merged = texts(&output);
    assert_eq!(merged.len(), 2);
    assert!(merged.contains(&"a".to_string()));
    assert!(merged.contains(&"b".to_string()));
}

#[test]
fn test_duplicate_inputs_merge_once() {
    let dir = temp_dir();
    let a = write_docx(&dir, "a.docx", &["a"]);
    let output = dir.path().join("out.docx");

    let inputs = collect_inputs([a.clone(), a]).unwrap();
    merge_documents(&quiet_config(inputs.as_slice(), &output)).unwrap();

    assert_eq!(texts(&output), vec!["a"]);
}
