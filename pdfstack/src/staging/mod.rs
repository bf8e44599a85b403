//! The staging store.
//!
//! An ordered collection of accepted documents, unique by [`EntryId`]. The
//! position of an entry is its merge position. The store enforces its own
//! length ceiling, independently of the validator.
//!
//! # Examples
//!
//! ```
//! use pdfstack::io::{MemorySource, SourceHandle};
//! use pdfstack::staging::StagingStore;
//! use std::sync::Arc;
//!
//! let mut store = StagingStore::new(3);
//! let batch: Vec<SourceHandle> = vec![
//!     Arc::new(MemorySource::pdf("a.pdf", vec![0; 10])),
//!     Arc::new(MemorySource::pdf("b.pdf", vec![0; 20])),
//! ];
//!
//! let ids = store.append(batch).unwrap();
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.total_size(), 30);
//!
//! store.remove_by_id(&ids[0]);
//! assert_eq!(store.entries()[0].display_name(), "b.pdf");
//! ```

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::config::Limits;
use crate::error::{PdfStackError, Result};
use crate::io::SourceHandle;
use crate::validation::check_quota;

/// Opaque, unique identifier of a staged entry.
///
/// Generated at acceptance time and stable for the entry's lifetime. It is
/// the only key used for removal and reorder lookups; display names are not
/// guaranteed unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One accepted document awaiting merge.
#[derive(Debug, Clone)]
pub struct StagedEntry {
    id: EntryId,
    source: SourceHandle,
    display_name: String,
    size_bytes: u64,
}

impl StagedEntry {
    /// Wrap a source in a new entry with a freshly generated id.
    ///
    /// The display name and size are captured from the source now.
    pub fn new(source: SourceHandle) -> Self {
        Self {
            id: EntryId::generate(),
            display_name: source.name().to_string(),
            size_bytes: source.size_bytes(),
            source,
        }
    }

    /// Entry id.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Handle to the original payload.
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Payload length captured at acceptance time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Ordered, uniquely keyed collection of staged entries.
#[derive(Debug, Clone)]
pub struct StagingStore {
    entries: Vec<StagedEntry>,
    max_entries: usize,
}

impl StagingStore {
    /// Create an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Create an empty store sized from `limits`.
    pub fn with_limits(limits: &Limits) -> Self {
        Self::new(limits.max_entries)
    }

    /// Append a batch at the tail, preserving batch order.
    ///
    /// Every source gets a fresh id. If the resulting length would exceed
    /// the maximum, nothing is appended.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::QuotaExceeded`] when the batch does not fit.
    pub fn append(&mut self, sources: Vec<SourceHandle>) -> Result<Vec<EntryId>> {
        check_quota(self.entries.len(), sources.len(), self.max_entries)?;

        let added: Vec<StagedEntry> = sources.into_iter().map(StagedEntry::new).collect();
        let ids = added.iter().map(StagedEntry::id).collect();
        self.entries.extend(added);

        tracing::debug!(total = self.entries.len(), "staged batch appended");
        Ok(ids)
    }

    /// Remove the entry with `id`.
    ///
    /// An absent id is not an error; the store is left unchanged and `None`
    /// is returned.
    pub fn remove_by_id(&mut self, id: &EntryId) -> Option<StagedEntry> {
        let position = self.position(id)?;
        Some(self.entries.remove(position))
    }

    /// Replace the order wholesale with `sequence`.
    ///
    /// `sequence` must hold exactly the current entries (same ids, same
    /// count) in any order.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `sequence` is not a permutation of the
    /// current entries.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::NotAPermutation`] in release builds when
    /// `sequence` is not a permutation; the order is left untouched.
    pub fn reorder(&mut self, sequence: Vec<StagedEntry>) -> Result<()> {
        if !self.is_permutation(&sequence) {
            if cfg!(debug_assertions) {
                panic!("reorder sequence is not a permutation of the staged entries");
            }
            return Err(PdfStackError::NotAPermutation {
                expected: self.entries.len(),
                actual: sequence.len(),
            });
        }

        self.entries = sequence;
        Ok(())
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    fn is_permutation(&self, sequence: &[StagedEntry]) -> bool {
        if sequence.len() != self.entries.len() {
            return false;
        }

        let current: HashSet<EntryId> = self.entries.iter().map(StagedEntry::id).collect();
        let mut seen = HashSet::with_capacity(sequence.len());

        sequence
            .iter()
            .all(|entry| current.contains(&entry.id) && seen.insert(entry.id))
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in merge order.
    pub fn entries(&self) -> &[StagedEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &EntryId) -> Option<&StagedEntry> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    /// Position of an entry by id.
    pub fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == *id)
    }

    /// Ids in merge order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(StagedEntry::id).collect()
    }

    /// Cumulative payload size of all entries.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(StagedEntry::size_bytes).sum()
    }

    /// Number of entries that can still be appended.
    pub fn remaining_slots(&self) -> usize {
        self.max_entries.saturating_sub(self.entries.len())
    }

    /// Configured maximum length.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Owned copy of the current order, for consumers that outlive a borrow.
    pub fn snapshot(&self) -> Vec<StagedEntry> {
        self.entries.clone()
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::with_limits(&Limits::default())
    }
}
