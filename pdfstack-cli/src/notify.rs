//! Console rendering of session notices.

use pdfstack::notify::{MergeFailureKind, Notice, Notifier, Severity};
use pdfstack::validation::RejectionReason;

use crate::output::OutputFormatter;

/// Renders each [`Notice`] as one line through the [`OutputFormatter`].
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    formatter: OutputFormatter,
}

impl ConsoleNotifier {
    pub fn new(formatter: OutputFormatter) -> Self {
        Self { formatter }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let message = describe(&notice);
        match notice.severity() {
            Severity::Info => self.formatter.info(&message),
            Severity::Success => self.formatter.success(&message),
            Severity::Error => self.formatter.error(&message),
        }
    }
}

/// Human-readable text for a notice.
pub fn describe(notice: &Notice) -> String {
    match notice {
        Notice::FilesAdded { count } => format!("Staged {count} file(s)"),
        Notice::FileRejected { name, reason } => {
            format!("Skipped {name}: {}", describe_rejection(*reason))
        }
        Notice::QuotaExceeded {
            requested,
            available,
            max,
        } => format!(
            "Cannot stage {requested} file(s): only {available} of {max} slot(s) remain"
        ),
        Notice::FileRemoved { name, .. } => format!("Removed {name}"),
        Notice::Cleared { count } => format!("Cleared {count} staged file(s)"),
        Notice::MergeCompleted { filename, pages } => {
            format!("Merged {pages} page(s) into {filename}")
        }
        Notice::MergeFailed { reason, name, .. } => match (reason, name) {
            (MergeFailureKind::EmptyInput, _) => "Nothing to merge: no files are staged".into(),
            (MergeFailureKind::UnreadableDocument, Some(name)) => {
                format!("Merge failed: {name} could not be read as a PDF")
            }
            (MergeFailureKind::UnreadableDocument, None) => {
                "Merge failed: a staged file could not be read as a PDF".into()
            }
            (MergeFailureKind::Internal, _) => "Merge failed while building the output".into(),
        },
        Notice::InvalidMove { from, to, len } => format!(
            "Cannot move {} to {}: only {len} file(s) are staged",
            from + 1,
            to + 1
        ),
        Notice::MergeInProgress => "A merge is in progress; try again when it finishes".into(),
    }
}

fn describe_rejection(reason: RejectionReason) -> &'static str {
    match reason {
        RejectionReason::InvalidType => "not a PDF file",
        RejectionReason::TooLarge => "larger than the per-file size limit",
        RejectionReason::QuotaExceeded => "too many files staged",
    }
}
