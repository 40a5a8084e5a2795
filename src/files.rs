//! Input discovery and ordering
//!
//! Both pipelines scan a single directory (non-recursively), keep the regular
//! files whose name matches a glob pattern, and order them so that numbered
//! question files come out as `1, 2, 10` rather than `1, 10, 2`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{Error, Result};

/// A file selected for rendering or merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
    stem: String,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, stem }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// File name for status lines.
    pub fn name(&self) -> String {
        display_name(&self.path)
    }

    /// The stem, if it consists only of ASCII digits.
    ///
    /// A purely numeric stem doubles as the question number the page starts with.
    pub fn numeric_stem(&self) -> Option<&str> {
        let stem = self.stem.as_str();
        (!stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit())).then_some(stem)
    }

    /// Maximal run of ASCII digits at the start of the stem (may be empty).
    pub fn leading_digits(&self) -> &str {
        let end = self
            .stem
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(self.stem.len());
        &self.stem[..end]
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Which part of the stem decides numeric placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    /// Numeric only when the whole stem is digits (`12.html`). Used for HTML inputs.
    WholeStem,
    /// Numeric when the stem starts with digits (`12-intro.pdf`). Used for PDF inputs.
    LeadingDigits,
}

/// Sort key: every numeric key orders before every name key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Numeric(DecimalKey),
    Name(String),
}

/// Arbitrary-length unsigned decimal compared by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalKey(String);

impl DecimalKey {
    /// `digits` must be non-empty ASCII digits.
    fn new(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        DecimalKey(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    }
}

impl Ord for DecimalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for DecimalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl SortRule {
    pub fn key(self, file: &InputFile) -> SortKey {
        let digits = match self {
            SortRule::WholeStem => file.numeric_stem().unwrap_or(""),
            SortRule::LeadingDigits => file.leading_digits(),
        };
        if digits.is_empty() {
            SortKey::Name(file.stem().to_lowercase())
        } else {
            SortKey::Numeric(DecimalKey::new(digits))
        }
    }
}

/// Sort files in place by `rule`, breaking ties by file name so the order
/// never depends on directory iteration order.
pub fn sort_files(files: &mut [InputFile], rule: SortRule) {
    files.sort_by(|a, b| {
        rule.key(a)
            .cmp(&rule.key(b))
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
}

/// List regular files directly inside `dir` whose name matches `pattern`, sorted by `rule`.
pub fn list_matching(dir: &Path, pattern: &str, rule: SortRule) -> Result<Vec<InputFile>> {
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let pattern = Pattern::new(pattern)
        .map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| pattern.matches(name));
        if matched {
            files.push(InputFile::new(path));
        }
    }

    sort_files(&mut files, rule);
    Ok(files)
}

/// Last path component, or the whole path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand a leading `~` and make the path absolute.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    Ok(std::path::absolute(expanded)?)
}
