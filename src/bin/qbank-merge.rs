//! PDF merge CLI
//!
//! Merges the PDFs in one directory into a single file, numbered files first.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use qbank_pdf::files::resolve_path;
use qbank_pdf::logging;
use qbank_pdf::pdf::merge_directory;

/// Merge a directory of PDFs in natural order
#[derive(Parser)]
#[command(name = "qbank-merge")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # 1.pdf, 2.pdf, 10.pdf, then named files alphabetically
    qbank-merge --input-dir pdf --output All_Questions.pdf

    # Only the chapter files
    qbank-merge --input-dir pdf --pattern \"ch*.pdf\" --output chapters.pdf")]
struct Cli {
    /// Directory containing the PDFs
    #[arg(long)]
    input_dir: PathBuf,

    /// File name pattern to merge
    #[arg(long, default_value = "*.pdf")]
    pattern: String,

    /// Merged PDF path (parent directories are created)
    #[arg(long)]
    output: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let input_dir = match resolve_path(&cli.input_dir) {
        Ok(dir) if dir.is_dir() => dir,
        _ => {
            eprintln!(
                "ERROR: input-dir does not exist or is not a directory: {}",
                cli.input_dir.display()
            );
            process::exit(2);
        }
    };

    if let Err(e) = run(&input_dir, &cli.pattern, &cli.output) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(input_dir: &Path, pattern: &str, output: &Path) -> Result<()> {
    let output = resolve_path(output)?;
    let report = merge_directory(input_dir, pattern, &output)
        .with_context(|| format!("failed to merge PDFs from {}", input_dir.display()))?;

    if let Some(written) = &report.output {
        info!(
            "Wrote {} ({} pages from {} files, {} skipped)",
            written.display(),
            report.page_count,
            report.merged.len(),
            report.skipped.len()
        );
    }
    info!("Done.");
    Ok(())
}
