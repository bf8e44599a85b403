//! Output delivery.
//!
//! The merge engine produces bytes and a filename; this module puts those
//! bytes on disk. It provides:
//! - Atomic writes (write to a sibling temp file, then rename)
//! - Buffered writing on a blocking task
//! - Pre-flight checks for the output location
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.save_bytes(&bytes, Path::new("merged.pdf")).await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfStackError, Result};
use crate::merge::MergeResult;
use crate::utils::format_file_size;

/// Options for writing output files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writer for merged output.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Write a merge result to `path`.
    ///
    /// # Errors
    ///
    /// See [`PdfWriter::save_bytes`].
    pub async fn save(&self, result: &MergeResult, path: &Path) -> Result<WriteStatistics> {
        self.save_bytes(&result.bytes, path).await
    }

    /// Write raw bytes to `path` and return statistics about the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output (or temp) file cannot be created
    /// - Writing or flushing fails
    /// - The final rename fails
    pub async fn save_bytes(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let payload: Arc<[u8]> = Arc::from(bytes);

        task::spawn_blocking(move || write_blocking(&payload, path_buf, &options))
            .await
            .map_err(|e| PdfStackError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist
    /// - Parent directory is not writable
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfStackError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ))
            } else {
                PdfStackError::FileNotAccessible {
                    path: parent.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(PdfStackError::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PdfStackError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    let write_path = if options.atomic {
        temp_path_for(&path)
    } else {
        path.clone()
    };

    let file =
        std::fs::File::create(&write_path).map_err(|e| PdfStackError::FailedToCreateOutput {
            path: write_path.clone(),
            source: e,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| {
            discard_temp(options, &write_path);
            PdfStackError::FailedToWrite {
                path: write_path.clone(),
                source: e,
            }
        })?;
    drop(writer);

    if options.atomic {
        std::fs::rename(&write_path, &path).map_err(|e| {
            discard_temp(options, &write_path);
            PdfStackError::FailedToWrite {
                path: path.clone(),
                source: e,
            }
        })?;
    }

    let file_size = std::fs::metadata(&path)
        .map(|m| m.len())
        .unwrap_or(bytes.len() as u64);

    tracing::debug!(path = %path.display(), bytes = file_size, "output written");

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
    })
}

/// Sibling temp path: `merged.pdf` becomes `.merged.pdf.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| path.as_os_str()));
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard_temp(options: &WriteOptions, write_path: &Path) {
    if options.atomic {
        let _ = std::fs::remove_file(write_path);
    }
}
