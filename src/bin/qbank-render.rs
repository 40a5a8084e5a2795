//! Batch renderer CLI
//!
//! Prints every matching HTML question page in a directory to its own PDF,
//! optionally merging the results into one file.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use qbank_pdf::files::resolve_path;
use qbank_pdf::logging;
use qbank_pdf::render::browser::{BrowserOptions, ChromiumRenderer};
use qbank_pdf::render::{collect_inputs, run_batch, BatchOptions};

/// Render HTML question pages to PDF with headless Chromium
#[derive(Parser)]
#[command(name = "qbank-render")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Render every page in ./html into ./pdf
    qbank-render --input-dir html --out-dir pdf

    # Also produce one combined file
    qbank-render --input-dir html --out-dir pdf --combined-output All_Questions.pdf

    # Inside a container
    qbank-render --input-dir html --out-dir pdf --no-sandbox")]
struct Cli {
    /// Directory containing the HTML files
    #[arg(long)]
    input_dir: PathBuf,

    /// File name pattern to render
    #[arg(long, default_value = BatchOptions::DEFAULT_PATTERN)]
    pattern: String,

    /// Directory for the per-file PDFs (created if missing)
    #[arg(long)]
    out_dir: PathBuf,

    /// Also merge all generated PDFs into this file
    #[arg(long)]
    combined_output: Option<PathBuf>,

    /// Chrome/Chromium executable (auto-detected by default)
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Milliseconds to wait after the page settles before printing
    #[arg(long, default_value_t = 200)]
    settle_ms: u64,

    /// Launch Chromium without its sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(failed) => process::exit(if failed > 0 { 1 } else { 0 }),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns the number of files that failed.
async fn run(cli: Cli) -> Result<usize> {
    let options = BatchOptions {
        input_dir: resolve_path(&cli.input_dir)?,
        pattern: cli.pattern,
        out_dir: resolve_path(&cli.out_dir)?,
        combined_output: cli.combined_output.as_deref().map(resolve_path).transpose()?,
    };

    let files = collect_inputs(&options)
        .with_context(|| format!("cannot read input directory {}", options.input_dir.display()))?;
    if files.is_empty() {
        info!(
            "No files matched in {} with pattern {}",
            options.input_dir.display(),
            options.pattern
        );
        return Ok(0);
    }

    let browser_options = BrowserOptions {
        chrome_executable: cli.chrome,
        settle_delay: Duration::from_millis(cli.settle_ms),
        sandbox: !cli.no_sandbox,
        ..BrowserOptions::default()
    };
    let mut renderer = ChromiumRenderer::launch(browser_options)
        .await
        .context("failed to launch Chromium")?;

    let summary = run_batch(&mut renderer, &files, &options)
        .await
        .context("failed to write the combined PDF")?;

    info!("Done. Success: {}, Failed: {}", summary.succeeded(), summary.failed());
    Ok(summary.failed())
}
