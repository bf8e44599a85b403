//! Structured user notifications.
//!
//! The library never formats user-facing text. Every outcome a user should
//! hear about is emitted as a [`Notice`] with a structured reason; the
//! presentation layer decides how to say it.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

use crate::staging::EntryId;
use crate::validation::RejectionReason;

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// A completed operation.
    Success,
    /// A failure the user must act on.
    Error,
}

/// Why a merge did not produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeFailureKind {
    /// Nothing was staged.
    EmptyInput,
    /// An entry could not be read or parsed.
    UnreadableDocument,
    /// The output could not be assembled.
    Internal,
}

/// One user-facing outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// Files were staged.
    FilesAdded {
        /// Number of entries appended.
        count: usize,
    },

    /// A file was turned away at ingestion.
    FileRejected {
        /// Display name of the file.
        name: String,
        /// Structured reason.
        reason: RejectionReason,
    },

    /// A whole batch was turned away for quota.
    QuotaExceeded {
        /// Batch size.
        requested: usize,
        /// Slots free before the batch.
        available: usize,
        /// Configured maximum.
        max: usize,
    },

    /// An entry was removed.
    FileRemoved {
        /// Id of the removed entry.
        id: EntryId,
        /// Its display name.
        name: String,
    },

    /// The staging collection was emptied.
    Cleared {
        /// Number of entries removed.
        count: usize,
    },

    /// A merge produced output.
    MergeCompleted {
        /// Output filename.
        filename: String,
        /// Pages in the output.
        pages: usize,
    },

    /// A merge failed; nothing was produced.
    MergeFailed {
        /// What went wrong.
        reason: MergeFailureKind,
        /// The offending entry, if one is to blame.
        entry: Option<EntryId>,
        /// Display name of the offending entry.
        name: Option<String>,
    },

    /// A move named a position outside the collection; the order is unchanged.
    InvalidMove {
        /// Requested source index (0-indexed).
        from: usize,
        /// Requested target index (0-indexed).
        to: usize,
        /// Collection length at the time.
        len: usize,
    },

    /// An operation was refused because a merge is running.
    MergeInProgress,
}

impl Notice {
    /// Severity of this notice.
    pub fn severity(&self) -> Severity {
        match self {
            Self::FilesAdded { .. } | Self::MergeCompleted { .. } => Severity::Success,
            Self::FileRemoved { .. } | Self::Cleared { .. } => Severity::Info,
            Self::FileRejected { .. }
            | Self::QuotaExceeded { .. }
            | Self::MergeFailed { .. }
            | Self::InvalidMove { .. }
            | Self::MergeInProgress => Severity::Error,
        }
    }
}

/// Receiver of user-facing notices.
pub trait Notifier {
    /// Deliver one notice.
    fn notify(&self, notice: Notice);
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: Notice) {}
}

impl<F> Notifier for F
where
    F: Fn(Notice),
{
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// Keeps every notice for later inspection.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Drain all notices received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
