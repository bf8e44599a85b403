//! Core merge implementation.
//!
//! Entries are processed strictly one at a time and in staging order: read
//! the payload, parse it, append its pages. Only one decoded source document
//! is alive next to the accumulator at any moment, and the first unreadable
//! entry in merge order is the one reported. Nothing is produced unless
//! every entry was appended.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::PDF_MIME_TYPE;
use crate::config::CompressionLevel;
use crate::error::{PdfStackError, Result};
use crate::merge::codec::{DocumentCodec, LopdfCodec};
use crate::staging::{EntryId, StagedEntry};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of entries merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Pages contributed by each entry, in merge order.
    pub pages_per_entry: Vec<usize>,

    /// Total size of the input payloads.
    pub input_size: u64,

    /// Size of the serialized output.
    pub output_size: u64,

    /// Time spent reading and parsing inputs.
    pub load_time: Duration,

    /// Total time taken for the merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The serialized output document.
    pub bytes: Vec<u8>,

    /// Date-stamped output filename.
    pub filename: String,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

impl MergeResult {
    /// MIME type of the output.
    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }
}

/// Page count of one entry, as reported by [`Merger::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedEntry {
    /// Entry id.
    pub id: EntryId,

    /// Display name.
    pub name: String,

    /// Number of pages the entry would contribute.
    pub pages: usize,
}

/// Derive the output filename for a merge run on `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use pdfstack::merge::output_filename;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(output_filename(date), "merged-pdf-2024-03-09.pdf");
/// ```
pub fn output_filename(date: NaiveDate) -> String {
    format!("merged-pdf-{}.pdf", date.format("%Y-%m-%d"))
}

/// Merge engine over a document codec.
#[derive(Debug, Clone)]
pub struct Merger<C = LopdfCodec> {
    codec: Arc<C>,
}

impl Merger<LopdfCodec> {
    /// Create a PDF merger with standard compression.
    pub fn new() -> Self {
        Self::with_codec(LopdfCodec::default())
    }

    /// Create a PDF merger with the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self::with_codec(LopdfCodec::new(compression))
    }
}

impl Default for Merger<LopdfCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DocumentCodec> Merger<C> {
    /// Create a merger over any codec.
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }

    /// The codec in use.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Merge entries in the given order, stamping the filename with today's
    /// UTC date.
    ///
    /// # Errors
    ///
    /// See [`Merger::merge_on`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstack::merge::Merger;
    /// # use pdfstack::staging::StagingStore;
    /// # async fn example(store: StagingStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let result = merger.merge(store.entries()).await?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, entries: &[StagedEntry]) -> Result<MergeResult> {
        self.merge_on(entries, Utc::now().date_naive()).await
    }

    /// Merge entries in the given order, stamping the filename with `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `entries` is empty ([`PdfStackError::EmptyInput`])
    /// - An entry cannot be read or parsed
    ///   ([`PdfStackError::UnreadableDocument`], first offender in order)
    /// - The output cannot be serialized
    pub async fn merge_on(&self, entries: &[StagedEntry], date: NaiveDate) -> Result<MergeResult> {
        if entries.is_empty() {
            return Err(PdfStackError::EmptyInput);
        }

        let merge_start = Instant::now();
        let mut load_time = Duration::ZERO;
        let mut accumulator = self.codec.new_accumulator();
        let mut pages_per_entry = Vec::with_capacity(entries.len());

        for entry in entries {
            let load_start = Instant::now();
            let document = self.load(entry).await?;
            load_time += load_start.elapsed();

            let appended = self
                .codec
                .append(&mut accumulator, document)
                .map_err(|e| {
                    PdfStackError::unreadable(entry.id(), entry.display_name(), e.to_string())
                })?;

            if appended == 0 {
                tracing::warn!(
                    id = %entry.id(),
                    name = entry.display_name(),
                    "document has no pages"
                );
            }
            tracing::debug!(
                id = %entry.id(),
                name = entry.display_name(),
                pages = appended,
                "entry appended"
            );
            pages_per_entry.push(appended);
        }

        let codec = Arc::clone(&self.codec);
        let bytes = task::spawn_blocking(move || codec.serialize(accumulator))
            .await
            .map_err(|e| PdfStackError::other(format!("Serialize task failed: {e}")))?
            .map_err(|e| PdfStackError::merge_failed(e.to_string()))?;

        let statistics = MergeStatistics {
            files_merged: entries.len(),
            total_pages: pages_per_entry.iter().sum(),
            pages_per_entry,
            input_size: entries.iter().map(StagedEntry::size_bytes).sum(),
            output_size: bytes.len() as u64,
            load_time,
            merge_time: merge_start.elapsed(),
        };

        tracing::info!(
            files = statistics.files_merged,
            pages = statistics.total_pages,
            bytes = statistics.output_size,
            "merge complete"
        );

        Ok(MergeResult {
            bytes,
            filename: output_filename(date),
            statistics,
        })
    }

    /// Load every entry in order and report its page count, without
    /// building any output.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::UnreadableDocument`] for the first entry
    /// that cannot be read or parsed.
    pub async fn plan(&self, entries: &[StagedEntry]) -> Result<Vec<PlannedEntry>> {
        let mut planned = Vec::with_capacity(entries.len());

        for entry in entries {
            let document = self.load(entry).await?;
            planned.push(PlannedEntry {
                id: entry.id(),
                name: entry.display_name().to_string(),
                pages: self.codec.unit_count(&document),
            });
        }

        Ok(planned)
    }

    /// Read and parse one entry's payload.
    async fn load(&self, entry: &StagedEntry) -> Result<C::Document> {
        let unreadable =
            |reason: String| PdfStackError::unreadable(entry.id(), entry.display_name(), reason);

        let bytes = entry
            .source()
            .read_all()
            .await
            .map_err(|e| unreadable(e.to_string()))?;

        let codec = Arc::clone(&self.codec);
        task::spawn_blocking(move || codec.parse(&bytes))
            .await
            .map_err(|e| unreadable(format!("parse task failed: {e}")))?
            .map_err(|e| unreadable(e.to_string()))
    }
}
