//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::files::{display_name, list_matching, InputFile, SortRule};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `/Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// An input left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: String,
}

/// What a merge did.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Inputs whose pages were appended, in merge order
    pub merged: Vec<PathBuf>,
    /// Inputs that could not be read
    pub skipped: Vec<SkippedInput>,
    /// Total pages in the output
    pub page_count: usize,
    /// Where the output was written; `None` when there was nothing to merge
    pub output: Option<PathBuf>,
}

/// Merge every PDF in `input_dir` matching `pattern`, in leading-number order.
///
/// A directory with no matching files is not an error: nothing is written
/// and the returned report is empty.
pub fn merge_directory(input_dir: &Path, pattern: &str, output_path: &Path) -> Result<MergeReport> {
    let files = list_matching(input_dir, pattern, SortRule::LeadingDigits)?;
    if files.is_empty() {
        info!("No PDFs found in {} matching {}", input_dir.display(), pattern);
        return Ok(MergeReport::default());
    }

    merge_pdfs(&MergeOptions {
        input_paths: files.into_iter().map(InputFile::into_path).collect(),
        output_path: output_path.to_path_buf(),
    })
}

/// Merge multiple PDF files into a single PDF
///
/// Inputs are appended whole, in the given order. An input that cannot be
/// read is logged and skipped; the rest are still merged.
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use qbank_pdf::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("1.pdf"),
///         PathBuf::from("2.pdf"),
///     ],
///     output_path: PathBuf::from("All_Questions.pdf"),
/// };
///
/// let report = merge_pdfs(&options).expect("Failed to merge");
/// println!("{} pages", report.page_count);
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    if options.input_paths.is_empty() {
        info!("No PDFs to merge");
        return Ok(report);
    }

    info!(
        "Merging {} PDFs into {}",
        options.input_paths.len(),
        options.output_path.display()
    );

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in &options.input_paths {
        let name = display_name(path);
        let mut doc = match load_pages(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("[SKIP] {}: {}", name, e);
                report.skipped.push(SkippedInput {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());

        // The old catalog and page tree nodes are replaced by ours
        objects.extend(
            doc.objects
                .into_iter()
                .filter(|(_, object)| !is_page_tree_node(object)),
        );

        info!("[OK]   {}", name);
        report.merged.push(path.clone());
    }

    let mut merged_doc = Document::with_version("1.5");

    // Add all collected objects FIRST
    merged_doc.objects.extend(objects);

    // new_object_id() must hand out IDs above everything we just added
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = merged_doc.add_object(info_dictionary());
    merged_doc.trailer.set("Info", Object::Reference(info_id));

    // Point every page at the new Pages node
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    if let Some(parent) = options.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    merged_doc.compress();
    merged_doc.save(&options.output_path)?;

    report.page_count = page_ids.len();
    report.output = Some(options.output_path.clone());
    info!(
        "Merged {} files ({} pages), skipped {}",
        report.merged.len(),
        report.page_count,
        report.skipped.len()
    );

    Ok(report)
}

/// Load a PDF and make every page self-contained, ready to be re-parented.
fn load_pages(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let mut doc = Document::load(path)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    inherit_page_attributes(&mut doc)?;
    Ok(doc)
}

/// Copy inherited attributes from the page tree onto each page.
///
/// Once pages move under a new Pages node they lose whatever their old
/// ancestors supplied (typically MediaBox and Resources).
fn inherit_page_attributes(doc: &mut Document) -> Result<()> {
    for page_id in doc.get_pages().into_values() {
        let mut inherited: Vec<(&[u8], Object)> = Vec::new();
        {
            let page = doc.get_dictionary(page_id)?;
            for key in INHERITABLE_KEYS {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = find_inherited(doc, page, key) {
                    inherited.push((key, value));
                }
            }
        }

        if inherited.is_empty() {
            continue;
        }
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}

/// Nearest ancestor value for `key`, walking the `/Parent` chain.
fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Catalog") | Ok(b"Pages")
        ),
        _ => false,
    }
}

fn info_dictionary() -> Dictionary {
    let mut info = Dictionary::new();
    info.set(
        "Producer",
        Object::string_literal(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))),
    );
    info.set(
        "CreationDate",
        Object::string_literal(chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
    );
    info
}
