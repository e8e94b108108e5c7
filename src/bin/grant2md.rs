//! CLI binary for grant2md.
//!
//! A thin shim over the library crate that maps CLI flags to configs,
//! drives the batch loops, and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grant2md::extract::{atomic_write, collect_inputs};
use grant2md::{
    extract_file, ingest_dir, load_document, orphan_aims_headings, parse_pdf, render_document,
    DataLayout, DocSkip, GrantMdError, IngestConfig, SegmentConfig, DEFAULT_GROBID_URL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render one partitioned grant and isolate its Specific Aims section
  grant2md extract data/01_full_json/R01_smith_2023.json --data-root data/

  # Process a whole directory of element dumps
  grant2md extract data/01_full_json/ --data-root data/

  # Convert a PDF via a local GROBID server instead
  grant2md convert data/00_raw_pdfs/R01_smith_2023.pdf -o data/02_full_md/R01_smith_2023.md

  # Collect reviewed aims files into the dataset JSONL
  grant2md ingest data/04_reviewed_aims_md -o data/05_clean_jsonl/reviewed_specific_aims.jsonl

  # Sanity-check a dump for aims headings with no body after them
  grant2md check data/01_full_json/R01_smith_2023.json

PIPELINE:
  00_raw_pdfs/          input PDFs (parsed externally by unstructured or GROBID)
  01_full_json/         unstructured element dumps      ← extract input
  02_full_md/           whole-grant Markdown            ← extract output
  03_specific_aims_md/  isolated aims sections          ← extract output
  metadata/             YAML sidecars                   ← extract output
  04_reviewed_aims_md/  human-reviewed aims Markdown    ← ingest input
  05_clean_jsonl/       one JSON record per grant       ← ingest output

EXIT STATUS:
  0  completed; individual documents may still have warnings
  ≠0 expected input entirely absent, upstream service failure, or no output
     produced at all. A document without a Specific Aims heading is a
     warning, never a nonzero exit.
"#;

/// Extract and normalize NIH grant text for corpus assembly.
#[derive(Parser, Debug)]
#[command(
    name = "grant2md",
    version,
    about = "Extract Specific Aims sections and clean Markdown from NIH grant PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "GRANT2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "GRANT2MD_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render element dumps to Markdown and isolate the Specific Aims section.
    Extract {
        /// One `*.json` element dump, or a directory of them.
        input: PathBuf,

        /// Data root the artifact directories are created under.
        #[arg(long, env = "GRANT2MD_DATA_ROOT")]
        data_root: PathBuf,

        /// Paragraph wrap column for generated Markdown.
        #[arg(long, env = "GRANT2MD_WRAP", default_value_t = 100)]
        wrap: usize,

        /// Keep consuming elements past the aims heading's page.
        #[arg(long)]
        no_same_page: bool,

        /// Stop the aims section at any unrecognized heading, not just the
        /// known next-section markers.
        #[arg(long)]
        stop_at_any_heading: bool,
    },

    /// Convert one PDF to Markdown via a GROBID server.
    Convert {
        /// Input PDF path.
        input: PathBuf,

        /// Output Markdown file.
        #[arg(short, long)]
        output: PathBuf,

        /// Base URL of the GROBID server.
        #[arg(long, env = "GRANT2MD_GROBID_URL", default_value = DEFAULT_GROBID_URL)]
        grobid_url: String,

        /// Paragraph wrap column for generated Markdown.
        #[arg(long, env = "GRANT2MD_WRAP", default_value_t = 100)]
        wrap: usize,
    },

    /// Collect reviewed Specific Aims Markdown into one JSONL dataset file.
    Ingest {
        /// Directory of reviewed `*.md` files.
        reviewed_dir: PathBuf,

        /// Output JSONL path (rewritten whole on every run).
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Report aims headings that are not followed by body text.
    Check {
        /// One `*.json` element dump.
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            input,
            data_root,
            wrap,
            no_same_page,
            stop_at_any_heading,
        } => {
            let config = SegmentConfig::builder()
                .wrap_width(wrap)
                .require_same_page(!no_same_page)
                .stop_at_any_heading(stop_at_any_heading)
                .build()
                .context("Invalid configuration")?;
            run_extract(&input, &data_root, &config, cli.quiet)
        }
        Command::Convert {
            input,
            output,
            grobid_url,
            wrap,
        } => {
            let config = SegmentConfig::builder()
                .wrap_width(wrap)
                .require_same_page(false)
                .build()
                .context("Invalid configuration")?;
            run_convert(&input, &output, &grobid_url, &config, cli.quiet).await
        }
        Command::Ingest {
            reviewed_dir,
            output,
        } => run_ingest(&reviewed_dir, &output, cli.quiet),
        Command::Check { input } => run_check(&input),
    }
}

fn run_extract(
    input: &Path,
    data_root: &Path,
    config: &SegmentConfig,
    quiet: bool,
) -> Result<()> {
    let layout = DataLayout::under(data_root);
    let files = collect_inputs(input, "json")?;
    if files.is_empty() {
        return Err(GrantMdError::NoElementFiles {
            dir: input.to_path_buf(),
        }
        .into());
    }

    let bar = if quiet || files.len() < 2 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} grants",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Extracting");
        bar
    };

    let mut aims_written = 0usize;
    let mut skipped: Vec<DocSkip> = Vec::new();
    for file in &files {
        match extract_file(file, &layout, config)? {
            None => aims_written += 1,
            Some(skip) => {
                bar.println(format!("  {} {skip}", yellow("⚠")));
                warn!("{skip}");
                skipped.push(skip);
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !quiet {
        eprintln!(
            "{} {} grant(s) rendered, {} aims section(s) written  →  {}",
            green("✔"),
            bold(&files.len().to_string()),
            bold(&aims_written.to_string()),
            data_root.display(),
        );
        if !skipped.is_empty() {
            eprintln!(
                "   {} document(s) without a Specific Aims heading",
                dim(&skipped.len().to_string())
            );
        }
    }
    Ok(())
}

async fn run_convert(
    input: &Path,
    output: &Path,
    grobid_url: &str,
    config: &SegmentConfig,
    quiet: bool,
) -> Result<()> {
    if !input.is_file() {
        return Err(GrantMdError::InputNotFound {
            path: input.to_path_buf(),
        }
        .into());
    }

    let doc = parse_pdf(input, grobid_url)
        .await
        .context("GROBID conversion failed")?;
    let markdown = render_document(&doc, config);
    atomic_write(output, markdown.as_bytes())?;

    if !quiet {
        eprintln!(
            "{} wrote clean text to {}",
            green("✔"),
            bold(&output.display().to_string())
        );
    }
    Ok(())
}

fn run_ingest(reviewed_dir: &Path, output: &Path, quiet: bool) -> Result<()> {
    let stats = ingest_dir(reviewed_dir, output, &IngestConfig::default())?;

    if !quiet {
        eprintln!(
            "{} ingested {}/{} file(s)  →  {}",
            green("✔"),
            bold(&stats.records_written.to_string()),
            stats.files_seen,
            output.display(),
        );
        for skip in &stats.skipped {
            eprintln!("   {} {skip}", yellow("⚠"));
        }
    }
    Ok(())
}

fn run_check(input: &Path) -> Result<()> {
    let doc = load_document(input)?;
    let orphans = orphan_aims_headings(&doc.elements);

    if orphans.is_empty() {
        println!(
            "{} Specific Aims heading(s) in '{}' are followed by body text",
            green("✔"),
            doc.document_id
        );
    } else {
        println!(
            "{} heading found but no paragraph after element(s) {:?} in '{}'",
            yellow("⚠"),
            orphans,
            doc.document_id
        );
    }
    Ok(())
}
