//! PDF manipulation module

pub mod merge;

// Re-export commonly used items
pub use merge::{merge_directory, merge_pdfs, MergeOptions, MergeReport, SkippedInput};
