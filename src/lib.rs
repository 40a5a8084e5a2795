//! Question Bank PDF Library
//!
//! Turns a directory of saved question pages into print-ready PDFs.
//! This library provides functionality to:
//! - Trim each page down to the question itself (see [`extract`])
//! - Render pages to PDF with headless Chromium (see [`render`])
//! - Merge PDFs in natural file order (see [`pdf`])
//!
//! # Example
//!
//! ```no_run
//! use qbank_pdf::pdf::merge_directory;
//! use std::path::Path;
//!
//! let report = merge_directory(
//!     Path::new("out"),
//!     "*.pdf",
//!     Path::new("All_Questions.pdf"),
//! ).expect("Failed to merge PDFs");
//!
//! println!("{} files, {} skipped", report.merged.len(), report.skipped.len());
//! ```

pub mod error;
pub mod extract;
pub mod files;
pub mod html;
pub mod logging;
pub mod pdf;
pub mod render;

// Re-export commonly used items
pub use error::{Error, Result};
