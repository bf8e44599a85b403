//! Session orchestration.
//!
//! A [`Session`] owns one staging store and drives the validator, the
//! reorder engine and the merge engine against it. It reports every outcome
//! to its [`Notifier`], failures included, and holds a single in-progress
//! flag while a merge runs; staging mutations are refused until the flag is
//! released.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::config::Limits;
//! use pdfstack::io::{MemorySource, SourceHandle};
//! use pdfstack::notify::CollectingNotifier;
//! use pdfstack::session::Session;
//! use std::sync::Arc;
//!
//! # async fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let notifier = CollectingNotifier::new();
//! let mut session = Session::new(Limits::default(), notifier.clone());
//!
//! let batch: Vec<SourceHandle> = vec![
//!     Arc::new(MemorySource::pdf("a.pdf", a)),
//!     Arc::new(MemorySource::pdf("b.pdf", b)),
//! ];
//! let report = session.ingest(batch)?;
//! assert_eq!(report.added.len(), 2);
//!
//! session.move_entry(1, 0)?;
//! let result = session.merge().await?;
//! println!("{} -> {:?}", result.filename, notifier.last());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Limits;
use crate::error::{PdfStackError, Result};
use crate::io::SourceHandle;
use crate::merge::{DocumentCodec, LopdfCodec, MergeResult, Merger, PlannedEntry};
use crate::notify::{MergeFailureKind, Notice, Notifier};
use crate::reorder::move_item;
use crate::staging::{EntryId, StagedEntry, StagingStore};
use crate::validation::{QuotaBreach, Rejection, Validator};

/// Shared "merge in progress" flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag(Arc<AtomicBool>);

impl ProcessingFlag {
    /// Create a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag, unless it is already set.
    ///
    /// The flag stays set until the returned guard is dropped.
    pub fn acquire(&self) -> Option<ProcessingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard {
                flag: Arc::clone(&self.0),
            })
    }

    /// True while a guard is alive.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears its [`ProcessingFlag`] when dropped.
#[derive(Debug)]
pub struct ProcessingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Outcome of one ingestion.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Ids of the appended entries, in batch order.
    pub added: Vec<EntryId>,

    /// Candidates that were turned away.
    pub rejections: Vec<Rejection>,

    /// Set when the whole batch was refused for quota.
    pub quota: Option<QuotaBreach>,
}

impl IngestReport {
    /// True if the batch was refused as a whole.
    pub fn quota_exceeded(&self) -> bool {
        self.quota.is_some()
    }
}

/// One staging-and-merge session.
#[derive(Debug)]
pub struct Session<N, C = LopdfCodec> {
    store: StagingStore,
    validator: Validator,
    merger: Merger<C>,
    notifier: N,
    processing: ProcessingFlag,
}

impl<N: Notifier> Session<N, LopdfCodec> {
    /// Start an empty PDF session.
    pub fn new(limits: Limits, notifier: N) -> Self {
        Self::with_merger(limits, notifier, Merger::new())
    }
}

impl<N: Notifier, C: DocumentCodec> Session<N, C> {
    /// Start an empty session over a specific merger.
    pub fn with_merger(limits: Limits, notifier: N, merger: Merger<C>) -> Self {
        Self {
            store: StagingStore::with_limits(&limits),
            validator: Validator::new(limits),
            merger,
            notifier,
            processing: ProcessingFlag::new(),
        }
    }

    /// The staged entries.
    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The limits in force.
    pub fn limits(&self) -> &Limits {
        self.validator.limits()
    }

    /// A handle on the in-progress flag.
    pub fn processing_flag(&self) -> ProcessingFlag {
        self.processing.clone()
    }

    /// True while a merge is running.
    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.processing.is_set() {
            self.notifier.notify(Notice::MergeInProgress);
            return Err(PdfStackError::MergeInProgress);
        }
        Ok(())
    }

    fn acquire(&self) -> Result<ProcessingGuard> {
        self.processing.acquire().ok_or_else(|| {
            self.notifier.notify(Notice::MergeInProgress);
            PdfStackError::MergeInProgress
        })
    }

    /// Validate a batch and stage what passes.
    ///
    /// Per-file rejections and quota refusals are part of the report, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::MergeInProgress`] while a merge runs.
    pub fn ingest(&mut self, batch: Vec<SourceHandle>) -> Result<IngestReport> {
        self.ensure_idle()?;

        let outcome = self.validator.validate(batch, self.store.len());

        if let Some(breach) = outcome.quota {
            self.notifier.notify(Notice::QuotaExceeded {
                requested: breach.requested,
                available: breach.available,
                max: breach.max,
            });
            return Ok(IngestReport {
                added: Vec::new(),
                rejections: outcome.rejections,
                quota: Some(breach),
            });
        }

        for rejection in &outcome.rejections {
            self.notifier.notify(Notice::FileRejected {
                name: rejection.name.clone(),
                reason: rejection.reason,
            });
        }

        let added = if outcome.accepted.is_empty() {
            Vec::new()
        } else {
            let added = self.store.append(outcome.accepted)?;
            self.notifier.notify(Notice::FilesAdded { count: added.len() });
            added
        };

        Ok(IngestReport {
            added,
            rejections: outcome.rejections,
            quota: None,
        })
    }

    /// Remove an entry by id; an unknown id is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::MergeInProgress`] while a merge runs.
    pub fn remove(&mut self, id: &EntryId) -> Result<Option<StagedEntry>> {
        self.ensure_idle()?;

        let removed = self.store.remove_by_id(id);
        if let Some(entry) = &removed {
            self.notifier.notify(Notice::FileRemoved {
                id: entry.id(),
                name: entry.display_name().to_string(),
            });
        }
        Ok(removed)
    }

    /// Move the entry at `from` to `to` (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A merge is running
    /// - Either index is out of range (the order is unchanged)
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;

        let len = self.store.len();
        let sequence = move_item(self.store.entries(), from, to).inspect_err(|err| {
            if matches!(err, PdfStackError::IndexOutOfRange { .. }) {
                self.notifier.notify(Notice::InvalidMove { from, to, len });
            }
        })?;
        self.store.reorder(sequence)
    }

    /// Empty the staging collection, returning how many entries were removed.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::MergeInProgress`] while a merge runs.
    pub fn clear(&mut self) -> Result<usize> {
        self.ensure_idle()?;

        let count = self.store.clear();
        self.notifier.notify(Notice::Cleared { count });
        Ok(count)
    }

    /// Merge the staged entries in their current order.
    ///
    /// The staging collection is left as it was, whether the merge succeeds
    /// or fails.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::MergeInProgress`] if another merge holds the
    /// flag, otherwise any error of [`Merger::merge`].
    pub async fn merge(&self) -> Result<MergeResult> {
        let _guard = self.acquire()?;

        let snapshot = self.store.snapshot();
        let result = self.merger.merge(&snapshot).await;

        match &result {
            Ok(merged) => self.notifier.notify(Notice::MergeCompleted {
                filename: merged.filename.clone(),
                pages: merged.statistics.total_pages,
            }),
            Err(err) => self.notifier.notify(failure_notice(err)),
        }

        result
    }

    /// Load every staged entry and report its page count, without merging.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::MergeInProgress`] if a merge holds the flag,
    /// or the first unreadable entry.
    pub async fn plan(&self) -> Result<Vec<PlannedEntry>> {
        let _guard = self.acquire()?;

        self.merger.plan(self.store.entries()).await
    }
}

fn failure_notice(err: &PdfStackError) -> Notice {
    match err {
        PdfStackError::EmptyInput => Notice::MergeFailed {
            reason: MergeFailureKind::EmptyInput,
            entry: None,
            name: None,
        },
        PdfStackError::UnreadableDocument { id, name, .. } => Notice::MergeFailed {
            reason: MergeFailureKind::UnreadableDocument,
            entry: Some(*id),
            name: Some(name.clone()),
        },
        _ => Notice::MergeFailed {
            reason: MergeFailureKind::Internal,
            entry: None,
            name: None,
        },
    }
}
