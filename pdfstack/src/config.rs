//! Configuration module for pdfstack.
//!
//! This module holds the ingestion limits used by the validator and the
//! staging store, and the validated run configuration the CLI derives from
//! its arguments. It handles:
//! - Limits with overridable defaults
//! - Parsing of move instructions
//! - Validation of argument combinations
//! - Output path resolution

use anyhow::{Context, Result, bail};

use crate::{PDF_MIME_TYPE, PdfStackError};
use std::{
    collections::HashSet,
    path::PathBuf,
    str::FromStr,
};

/// Default maximum number of staged entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default per-entry size ceiling (50 MiB).
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 50 * 1024 * 1024;

/// Ingestion limits shared by the validator and the staging store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of entries the staging collection may hold.
    pub max_entries: usize,

    /// Maximum payload size of a single entry, in bytes.
    pub max_entry_size: u64,

    /// The single content type accepted at ingestion.
    pub accepted_type: String,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            accepted_type: PDF_MIME_TYPE.to_string(),
        }
    }
}

impl Limits {
    /// Override the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Override the per-entry size ceiling.
    pub fn with_max_entry_size(mut self, max_entry_size: u64) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }

    /// Override the accepted content type.
    pub fn with_accepted_type(mut self, accepted_type: impl Into<String>) -> Self {
        self.accepted_type = accepted_type.into();
        self
    }

    /// Validate the limits.
    ///
    /// # Errors
    ///
    /// Returns an error if either ceiling is zero or the accepted type is blank.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            bail!("Maximum number of files must be at least 1");
        }

        if self.max_entry_size == 0 {
            bail!("Maximum file size must be greater than zero");
        }

        if self.accepted_type.trim().is_empty() {
            bail!("Accepted content type cannot be empty");
        }

        Ok(())
    }
}

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - objects are written as merged.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Prune unreferenced objects, then compress.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfStackError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// A single "move the document at `from` to `to`" instruction.
///
/// Positions are 1-indexed, matching the numbering shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    /// 1-indexed source position.
    pub from: usize,
    /// 1-indexed target position.
    pub to: usize,
}

impl MoveSpec {
    /// Parse a `FROM:TO` instruction.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstack::config::MoveSpec;
    ///
    /// let spec = MoveSpec::parse("1:3").unwrap();
    /// assert_eq!(spec.as_indices(), (0, 2));
    /// assert!(MoveSpec::parse("0:2").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let Some((from, to)) = s.trim().split_once(':') else {
            bail!("Invalid move: {s}. Expected format like '1:3'");
        };

        let from: usize = from
            .trim()
            .parse()
            .with_context(|| format!("Invalid position: {from}"))?;

        let to: usize = to
            .trim()
            .parse()
            .with_context(|| format!("Invalid position: {to}"))?;

        if from == 0 || to == 0 {
            bail!("Positions must be positive (1-indexed)");
        }

        Ok(Self { from, to })
    }

    /// Convert to 0-indexed `(source, target)` positions.
    pub fn as_indices(&self) -> (usize, usize) {
        (self.from - 1, self.to - 1)
    }
}

impl FromStr for MoveSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Complete configuration for one staging-and-merge run.
///
/// This structure contains all settings the CLI needs, derived and
/// validated from its arguments.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input paths, in staging order.
    pub inputs: Vec<PathBuf>,

    /// Output file or directory. `None` writes to the current directory.
    pub output: Option<PathBuf>,

    /// Dry run mode - stage and inspect without writing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Emit a machine-readable report on stdout.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Ingestion limits.
    pub limits: Limits,

    /// 1-indexed positions to remove after staging.
    pub removals: Vec<usize>,

    /// Moves applied in order after removals.
    pub moves: Vec<MoveSpec>,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - A removal position is zero or repeated
    /// - The limits are invalid
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        let mut seen = HashSet::new();
        for &position in &self.removals {
            if position == 0 {
                bail!("Positions must be positive (1-indexed)");
            }
            if !seen.insert(position) {
                bail!("Position {position} is removed more than once");
            }
        }

        self.limits.validate()?;

        Ok(())
    }

    /// Resolve where a result named `filename` should be written.
    ///
    /// Without an explicit output the file lands in the current directory;
    /// an existing directory receives the derived filename; any other path
    /// is used as given.
    pub fn output_path_for(&self, filename: &str) -> PathBuf {
        match &self.output {
            None => PathBuf::from(filename),
            Some(path) if path.is_dir() => path.join(filename),
            Some(path) => path.clone(),
        }
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet or json mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        (!self.quiet && !self.json) || self.dry_run
    }
}
