//! CLI argument parsing for pdfstack.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pdfstack::config::{CompressionLevel, Config, Limits, MoveSpec, OverwriteMode};
use pdfstack::error::{PdfStackError, Result};

const MIB: u64 = 1024 * 1024;

/// Stage, reorder and merge PDF files into a single document.
///
/// Files are staged in the order given, rejected files are reported and
/// skipped, then removals and moves are applied before the merge.
#[derive(Parser, Debug)]
#[command(name = "pdfstack")]
#[command(version)]
#[command(about = "Stage, reorder and merge PDF files into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns, staged in order
    ///
    /// Examples:
    ///   pdfstack a.pdf b.pdf
    ///   pdfstack 'chapters/*.pdf' -o book.pdf
    #[arg(required = true, value_name = "FILE|GLOB")]
    pub inputs: Vec<String>,

    /// Output file or directory
    ///
    /// Defaults to merged-pdf-<date>.pdf in the current directory. When a
    /// directory is given, the derived filename is written inside it.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Remove the staged file at this position (1-indexed, repeatable)
    ///
    /// All positions refer to the order after staging, before any removal.
    #[arg(short, long = "remove", value_name = "POS")]
    pub remove: Vec<usize>,

    /// Move the file at FROM to TO (1-indexed, repeatable)
    ///
    /// Moves are applied in order, after removals.
    ///
    /// Example:
    ///   pdfstack a.pdf b.pdf c.pdf -m 3:1
    #[arg(short, long = "move", value_name = "FROM:TO")]
    pub moves: Vec<String>,

    /// Dry run - stage, reorder and count pages without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show statistics and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print a machine-readable JSON report on stdout
    #[arg(long)]
    pub json: bool,

    /// Compression level for output PDF
    ///
    /// - none: objects are written as merged
    /// - standard: compress content streams (default)
    /// - maximum: drop unreferenced objects, then compress
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Maximum number of files that may be staged
    #[arg(long, value_name = "N", env = "PDFSTACK_MAX_FILES")]
    pub max_files: Option<usize>,

    /// Maximum size of a single file, in MiB
    #[arg(long, value_name = "MIB", env = "PDFSTACK_MAX_FILE_SIZE_MB")]
    pub max_file_size: Option<u64>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level or a move is malformed, or
    /// if the resulting configuration fails validation.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let moves = self
            .moves
            .iter()
            .map(|text| MoveSpec::parse(text))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut limits = Limits::default();
        if let Some(max_files) = self.max_files {
            limits = limits.with_max_entries(max_files);
        }
        if let Some(mib) = self.max_file_size {
            limits = limits.with_max_entry_size(mib.saturating_mul(MIB));
        }

        let config = Config {
            inputs: self.inputs.iter().map(PathBuf::from).collect(),
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            json: self.json,
            overwrite_mode,
            compression,
            limits,
            removals: self.remove.clone(),
            moves,
        };

        config.validate().map_err(|e| {
            PdfStackError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs the checks that need no file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfStackError::invalid_config("No input files specified"));
        }

        if !["none", "standard", "maximum"].contains(&self.compression.as_str()) {
            return Err(PdfStackError::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        if self.max_files == Some(0) {
            return Err(PdfStackError::invalid_config(
                "Maximum number of files must be at least 1",
            ));
        }

        if self.max_file_size == Some(0) {
            return Err(PdfStackError::invalid_config(
                "Maximum file size must be at least 1 MiB",
            ));
        }

        for text in &self.moves {
            MoveSpec::parse(text)?;
        }

        Ok(())
    }
}
