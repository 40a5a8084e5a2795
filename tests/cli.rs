//! Exit codes and messages of the two command-line tools

mod common;

use std::ffi::OsStr;
use std::process::{Command, Output};

use common::{page_texts, write_pdf};
use tempfile::TempDir;

fn qbank_merge(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qbank-merge"))
        .args(args)
        .output()
        .expect("run qbank-merge")
}

fn qbank_render(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qbank-render"))
        .args(args)
        .output()
        .expect("run qbank-render")
}

#[test]
fn test_merge_rejects_missing_input_dir() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let output = dir.path().join("merged.pdf");

    let result = qbank_merge(&[
        OsStr::new("--input-dir"),
        missing.as_os_str(),
        OsStr::new("--output"),
        output.as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("ERROR: input-dir does not exist or is not a directory:"));
    assert!(!output.exists());
}

#[test]
fn test_merge_rejects_file_as_input_dir() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("1.pdf");
    write_pdf(&file, &["one"]);

    let result = qbank_merge(&[
        OsStr::new("--input-dir"),
        file.as_os_str(),
        OsStr::new("--output"),
        dir.path().join("merged.pdf").as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn test_merge_with_no_matches_exits_cleanly_without_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
    let output = dir.path().join("merged.pdf");

    let result = qbank_merge(&[
        OsStr::new("--input-dir"),
        dir.path().as_os_str(),
        OsStr::new("--output"),
        output.as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(0));
    assert!(!output.exists());
}

#[test]
fn test_merge_writes_pdfs_in_numeric_order() {
    let dir = TempDir::new().unwrap();
    write_pdf(&dir.path().join("10.pdf"), &["ten"]);
    write_pdf(&dir.path().join("2.pdf"), &["two"]);
    let output = dir.path().join("out").join("merged.pdf");

    let result = qbank_merge(&[
        OsStr::new("--input-dir"),
        dir.path().as_os_str(),
        OsStr::new("--output"),
        output.as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(0));
    assert_eq!(page_texts(&output), vec!["two", "ten"]);
}

#[test]
fn test_render_with_empty_input_dir_exits_zero_without_a_browser() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("pdf");

    // A bogus executable proves no browser is launched
    let result = qbank_render(&[
        OsStr::new("--input-dir"),
        input.path().as_os_str(),
        OsStr::new("--out-dir"),
        out_dir.as_os_str(),
        OsStr::new("--combined-output"),
        out.path().join("All_Questions.pdf").as_os_str(),
        OsStr::new("--chrome"),
        out.path().join("no-such-chrome").as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(0));
    assert!(out_dir.is_dir());
    assert!(!out.path().join("All_Questions.pdf").exists());
}

#[test]
fn test_render_with_missing_input_dir_fails() {
    let out = TempDir::new().unwrap();

    let result = qbank_render(&[
        OsStr::new("--input-dir"),
        out.path().join("nope").as_os_str(),
        OsStr::new("--out-dir"),
        out.path().join("pdf").as_os_str(),
    ]);

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error:"));
}
