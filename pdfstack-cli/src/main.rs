//! pdfstack - Stage, reorder and merge PDF files into a single document.
//!
//! The command line plays the part of an interactive staging screen: files
//! are staged in argument order, removals and moves are applied, and the
//! merged result is written to disk.

mod cli;
mod notify;
mod output;

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::notify::ConsoleNotifier;
use crate::output::OutputFormatter;
use pdfstack::config::{Config, OverwriteMode};
use pdfstack::error::{PdfStackError, Result};
use pdfstack::io::{FileSource, PdfWriter, SourceHandle};
use pdfstack::merge::{Merger, PlannedEntry};
use pdfstack::notify::Notifier;
use pdfstack::session::Session;
use pdfstack::staging::{EntryId, StagedEntry};
use pdfstack::utils::{collect_paths_for_patterns, format_file_size};
use pdfstack::validation::Rejection;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    staged: Vec<StagedSummary>,
    rejections: Vec<Rejection>,
    dry_run: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    plan: Vec<PlannedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StagedSummary {
    id: EntryId,
    name: String,
    size_bytes: u64,
}

impl From<&StagedEntry> for StagedSummary {
    fn from(entry: &StagedEntry) -> Self {
        Self {
            id: entry.id(),
            name: entry.display_name().to_string(),
            size_bytes: entry.size_bytes(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputSummary {
    path: PathBuf,
    filename: String,
    pages: usize,
    size_bytes: u64,
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfstack::NAME, pdfstack::VERSION));
        formatter.blank_line();
    }

    let patterns: Vec<String> = config
        .inputs()
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    let paths = collect_paths_for_patterns(&patterns)?;
    tracing::debug!(patterns = patterns.len(), files = paths.len(), "Resolved inputs");

    let mut batch: Vec<SourceHandle> = Vec::with_capacity(paths.len());
    for path in &paths {
        batch.push(Arc::new(FileSource::open(path).await?));
    }

    let mut session = Session::with_merger(
        config.limits.clone(),
        ConsoleNotifier::new(formatter.clone()),
        Merger::with_compression(config.compression),
    );

    let ingest = session.ingest(batch)?;
    if let Some(breach) = ingest.quota {
        return Err(breach.into());
    }

    apply_edits(&mut session, &config)?;

    let mut report = RunReport {
        staged: session.store().entries().iter().map(StagedSummary::from).collect(),
        rejections: ingest.rejections,
        dry_run: config.dry_run,
        ..RunReport::default()
    };

    if formatter.should_print() {
        formatter.section(&format!(
            "Staged {} file(s), {}",
            session.store().len(),
            format_file_size(session.store().total_size())
        ));
        for (position, entry) in session.store().entries().iter().enumerate() {
            formatter.list_item(position + 1, entry.display_name());
        }
        formatter.blank_line();
    }

    if config.dry_run {
        let plan = session.plan().await?;
        let total: usize = plan.iter().map(|entry| entry.pages).sum();

        for (position, entry) in plan.iter().enumerate() {
            formatter.list_item(
                position + 1,
                &format!("{} ({} page(s))", entry.name, entry.pages),
            );
        }

        formatter.blank_line();
        formatter.success(&format!("Dry run completed: {total} page(s) would be merged"));
        formatter.info("  Run without --dry-run to create the merged PDF");

        report.plan = plan;
        return print_report(&config, &report);
    }

    formatter.info("Merging documents...");
    let result = session.merge().await?;

    let output_path = config.output_path_for(&result.filename);
    let writer = PdfWriter::new();
    writer.can_write(&output_path).await?;
    handle_output_overwrite(&writer, &output_path, config.overwrite_mode, &formatter).await?;

    formatter.info(&format!("Writing to: {}", output_path.display()));
    let write_stats = writer.save(&result, &output_path).await?;

    if formatter.should_print() {
        formatter.blank_line();
        formatter.success(&format!(
            "Successfully created {} ({})",
            output_path.display(),
            write_stats.format_file_size()
        ));

        if formatter.is_verbose() {
            formatter.section("Statistics");
            formatter.detail("Input files", &result.statistics.files_merged.to_string());
            formatter.detail("Total pages", &result.statistics.total_pages.to_string());
            formatter.detail("Input size", &result.statistics.format_input_size());
            formatter.detail("Output size", &write_stats.format_file_size());
            formatter.detail(
                "Load time",
                &format!("{:.2}s", result.statistics.load_time.as_secs_f64()),
            );
            formatter.detail(
                "Merge time",
                &format!("{:.2}s", result.statistics.merge_time.as_secs_f64()),
            );
            formatter.detail(
                "Write time",
                &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
            );
        }
    }

    report.output = Some(OutputSummary {
        path: write_stats.output_path.clone(),
        filename: result.filename.clone(),
        pages: result.statistics.total_pages,
        size_bytes: write_stats.file_size,
    });

    print_report(&config, &report)
}

/// Apply `--remove` then `--move` to the staged collection.
///
/// Removal positions are resolved to ids up front, so every position refers
/// to the order right after staging.
fn apply_edits<N: Notifier>(session: &mut Session<N>, config: &Config) -> Result<()> {
    let len = session.store().len();
    let doomed = config
        .removals
        .iter()
        .map(|&position| {
            position
                .checked_sub(1)
                .and_then(|index| session.store().entries().get(index))
                .map(StagedEntry::id)
                .ok_or_else(|| out_of_range(position, len))
        })
        .collect::<Result<Vec<_>>>()?;

    for id in &doomed {
        session.remove(id)?;
    }

    for spec in &config.moves {
        let (from, to) = spec.as_indices();
        let len = session.store().len();
        session
            .move_entry(from, to)
            .map_err(|err| match err {
                PdfStackError::IndexOutOfRange { index, .. } => out_of_range(index + 1, len),
                other => other,
            })?;
    }

    Ok(())
}

fn out_of_range(position: usize, len: usize) -> PdfStackError {
    PdfStackError::invalid_config(format!(
        "Position {position} is out of range for {len} staged file(s)"
    ))
}

fn print_report(config: &Config, report: &RunReport) -> Result<()> {
    if !config.json {
        return Ok(());
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|err| PdfStackError::other(format!("Failed to encode report: {err}")))?;
    println!("{json}");
    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    writer: &PdfWriter,
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<()> {
    if !writer.exists(output).await {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfStackError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            // No one to ask in quiet or json mode
            if formatter.is_quiet() {
                return Err(PdfStackError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfStackError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(PdfStackError::Cancelled)
            }
        }
    }
}
