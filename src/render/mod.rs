//! Batch rendering of question pages to PDF
//!
//! The batch loop is written against the [`PageRenderer`] trait so that the
//! ordering, bookkeeping and failure isolation can be exercised without a
//! browser; [`browser::ChromiumRenderer`] is the real implementation.

pub mod browser;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::files::{display_name, list_matching, InputFile, SortRule};
use crate::pdf::{merge_pdfs, MergeOptions, MergeReport};

/// One page to render.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    /// The HTML file to load
    pub source: &'a Path,
    /// Where the PDF goes
    pub output: &'a Path,
    /// Question number the content is expected to start with
    pub start_token: Option<&'a str>,
}

/// Turns one HTML file into one PDF.
///
/// Implementations must release whatever per-page resources they open
/// before returning, whether or not rendering succeeded.
#[async_trait]
pub trait PageRenderer {
    async fn render(&mut self, job: &RenderJob<'_>) -> Result<()>;

    /// Release the renderer once the batch is done.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Outcome of rendering one input file.
#[derive(Debug)]
pub struct RenderResult {
    pub source: PathBuf,
    /// The written PDF, or the reason there is none
    pub outcome: std::result::Result<PathBuf, String>,
}

impl RenderResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn output(&self) -> Option<&Path> {
        self.outcome.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }
}

/// Everything a batch run produced, in processing order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<RenderResult>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// PDFs written, in the order they were produced.
    pub fn generated(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.output().map(Path::to_path_buf))
            .collect()
    }
}

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for inputs
    pub input_dir: PathBuf,
    /// File name filter
    pub pattern: String,
    /// Destination for per-file PDFs, created if missing
    pub out_dir: PathBuf,
    /// Also merge the generated PDFs into this file
    pub combined_output: Option<PathBuf>,
}

impl BatchOptions {
    pub const DEFAULT_PATTERN: &'static str = "*.html";
}

/// Create the output directory and list the inputs in processing order.
pub fn collect_inputs(options: &BatchOptions) -> Result<Vec<InputFile>> {
    std::fs::create_dir_all(&options.out_dir)?;
    list_matching(&options.input_dir, &options.pattern, SortRule::WholeStem)
}

/// Render every file in order. A failing file is recorded and the loop moves on.
pub async fn render_files<R>(renderer: &mut R, files: &[InputFile], out_dir: &Path) -> BatchSummary
where
    R: PageRenderer + ?Sized,
{
    info!("Found {} files. Printing to {} ...", files.len(), out_dir.display());

    let mut summary = BatchSummary::default();
    for file in files {
        let output = out_dir.join(format!("{}.pdf", file.stem()));
        let job = RenderJob {
            source: file.path(),
            output: &output,
            start_token: file.numeric_stem(),
        };

        let outcome = match renderer.render(&job).await {
            Ok(()) => {
                info!("[OK]   {} -> {}", file.name(), display_name(&output));
                Ok(output)
            }
            Err(e) => {
                warn!("[FAIL] {} : {}", file.name(), e);
                Err(e.to_string())
            }
        };

        summary.results.push(RenderResult {
            source: file.path().to_path_buf(),
            outcome,
        });
    }

    summary
}

/// Render `files`, close the renderer, then write the combined PDF if asked.
///
/// Only the combined merge can fail the run. A renderer that does not shut
/// down cleanly is logged, since its PDFs are already written.
pub async fn run_batch<R>(renderer: &mut R, files: &[InputFile], options: &BatchOptions) -> Result<BatchSummary>
where
    R: PageRenderer + ?Sized + Send,
{
    let summary = render_files(renderer, files, &options.out_dir).await;
    if let Err(e) = renderer.close().await {
        warn!("Renderer did not shut down cleanly: {}", e);
    }

    if let Some(combined) = &options.combined_output {
        combine_outputs(&summary, combined)?;
    }
    Ok(summary)
}

/// Merge the PDFs a batch produced, in the order it produced them.
///
/// Returns `None` without writing anything when no file succeeded.
pub fn combine_outputs(summary: &BatchSummary, combined_output: &Path) -> Result<Option<MergeReport>> {
    let generated = summary.generated();
    if generated.is_empty() {
        return Ok(None);
    }

    let report = merge_pdfs(&MergeOptions {
        input_paths: generated,
        output_path: combined_output.to_path_buf(),
    })?;
    info!("Merged PDF created.");
    Ok(Some(report))
}
