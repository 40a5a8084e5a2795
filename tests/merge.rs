//! Integration tests for merging generated PDFs

mod common;

use std::path::Path;

use common::{page_count, page_texts, write_corrupt_pdf, write_pdf};
use qbank_pdf::pdf::{merge_directory, merge_pdfs, MergeOptions};
use qbank_pdf::Error;
use tempfile::TempDir;

fn fixture_dir(files: &[(&str, &[&str])]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for (name, texts) in files {
        write_pdf(&dir.path().join(name), texts);
    }
    dir
}

#[test]
fn test_merge_directory_orders_numbers_before_names() {
    let dir = fixture_dir(&[
        ("10.pdf", &["ten"]),
        ("2.pdf", &["two"]),
        ("file_a.pdf", &["file a"]),
        ("1.pdf", &["one"]),
    ]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("merged.pdf");

    let report = merge_directory(dir.path(), "*.pdf", &output).unwrap();

    assert_eq!(report.merged.len(), 4);
    assert!(report.skipped.is_empty());
    assert_eq!(report.page_count, 4);
    assert_eq!(page_count(&output), 4);
    assert_eq!(page_texts(&output), vec!["one", "two", "ten", "file a"]);
}

#[test]
fn test_leading_digits_count_for_pdf_names() {
    let dir = fixture_dir(&[
        ("10-final.pdf", &["ten"]),
        ("9-review.pdf", &["nine"]),
        ("appendix.pdf", &["appendix"]),
    ]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("merged.pdf");

    merge_directory(dir.path(), "*.pdf", &output).unwrap();

    assert_eq!(page_texts(&output), vec!["nine", "ten", "appendix"]);
}

#[test]
fn test_corrupt_input_is_skipped() {
    let dir = fixture_dir(&[
        ("1.pdf", &["one"]),
        ("2.pdf", &["two"]),
        ("4.pdf", &["four"]),
        ("5.pdf", &["five"]),
    ]);
    write_corrupt_pdf(&dir.path().join("3.pdf"));
    let output = dir.path().join("out").join("merged.pdf");

    let report = merge_directory(dir.path(), "*.pdf", &output).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, dir.path().join("3.pdf"));
    assert_eq!(report.merged.len(), 4);
    assert_eq!(page_texts(&output), vec!["one", "two", "four", "five"]);
}

#[test]
fn test_remerge_is_identical() {
    let dir = fixture_dir(&[
        ("1.pdf", &["a", "b"]),
        ("2.pdf", &["c"]),
        ("3.pdf", &["d", "e", "f"]),
    ]);
    let out = TempDir::new().unwrap();
    let first = out.path().join("first.pdf");
    let second = out.path().join("second.pdf");

    merge_directory(dir.path(), "*.pdf", &first).unwrap();
    merge_directory(dir.path(), "*.pdf", &second).unwrap();

    assert_eq!(page_count(&first), 6);
    assert_eq!(page_count(&second), 6);
    assert_eq!(page_texts(&first), page_texts(&second));
}

#[test]
fn test_empty_directory_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.pdf");

    let report = merge_directory(dir.path(), "*.pdf", &output).unwrap();

    assert!(report.output.is_none());
    assert!(report.merged.is_empty());
    assert!(!output.exists());
}

#[test]
fn test_pattern_filters_inputs() {
    let dir = fixture_dir(&[
        ("ch1.pdf", &["chapter one"]),
        ("ch2.pdf", &["chapter two"]),
        ("notes.pdf", &["notes"]),
    ]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("chapters.pdf");

    let report = merge_directory(dir.path(), "ch*.pdf", &output).unwrap();

    assert_eq!(report.merged.len(), 2);
    assert_eq!(page_texts(&output), vec!["chapter one", "chapter two"]);
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let result = merge_directory(&missing, "*.pdf", &dir.path().join("merged.pdf"));

    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[test]
fn test_merged_pages_keep_inherited_attributes() {
    let dir = fixture_dir(&[("1.pdf", &["one"]), ("2.pdf", &["two"])]);
    let output = dir.path().join("merged.pdf");

    merge_directory(dir.path(), "[0-9].pdf", &output).unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 2);
    for page_id in pages.into_values() {
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }
    assert!(doc.trailer.has(b"Info"));
}

#[test]
fn test_merge_pdfs_keeps_given_order() {
    let dir = fixture_dir(&[("1.pdf", &["one"]), ("2.pdf", &["two"]), ("3.pdf", &["three"])]);
    let output = dir.path().join("nested").join("dir").join("merged.pdf");

    let options = MergeOptions {
        input_paths: vec![
            dir.path().join("3.pdf"),
            dir.path().join("1.pdf"),
            dir.path().join("2.pdf"),
        ],
        output_path: output.clone(),
    };
    let report = merge_pdfs(&options).unwrap();

    assert_eq!(report.output.as_deref(), Some(output.as_path()));
    assert_eq!(page_texts(&output), vec!["three", "one", "two"]);
}

#[test]
fn test_nonexistent_input_is_skipped() {
    let dir = fixture_dir(&[("1.pdf", &["one"])]);
    let output = dir.path().join("merged.pdf");

    let options = MergeOptions {
        input_paths: vec![dir.path().join("1.pdf"), dir.path().join("missing.pdf")],
        output_path: output.clone(),
    };
    let report = merge_pdfs(&options).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.page_count, 1);
    assert_eq!(page_texts(&output), vec!["one"]);
}

#[test]
fn test_all_inputs_skipped_still_writes_output() {
    let dir = TempDir::new().unwrap();
    write_corrupt_pdf(&dir.path().join("1.pdf"));
    let output = dir.path().join("merged.pdf");

    let options = MergeOptions {
        input_paths: vec![dir.path().join("1.pdf")],
        output_path: output.clone(),
    };
    let report = merge_pdfs(&options).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.page_count, 0);
    assert!(Path::new(&output).exists());
    assert_eq!(page_count(&output), 0);
}
