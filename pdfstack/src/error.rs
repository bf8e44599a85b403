//! Error types for pdfstack.
//!
//! This module defines all error types that can occur while staging,
//! reordering and merging documents. Errors carry structured context so the
//! presentation layer can derive its own wording from them.
//!
//! # Error Categories
//!
//! - **Ingestion Errors**: wrong type, too large, quota exceeded
//! - **Ordering Errors**: index out of range, non-permutation reorder
//! - **Merge Errors**: empty input, unreadable document
//! - **I/O Errors**: file not found, output exists, write failures

use std::io;
use std::path::PathBuf;

use crate::staging::EntryId;

/// Result type alias for pdfstack operations.
pub type Result<T> = std::result::Result<T, PdfStackError>;

/// Main error type for pdfstack operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStackError {
    /// Candidate's declared content type is not the accepted document type.
    #[error("Invalid file type: {name} is {content_type}, expected {expected}")]
    InvalidType {
        /// Display name of the rejected file.
        name: String,
        /// Declared content type.
        content_type: String,
        /// The accepted content type.
        expected: String,
    },

    /// Candidate exceeds the per-entry size ceiling.
    #[error("File too large: {name} is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// Display name of the rejected file.
        name: String,
        /// Size of the file in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Batch would push the collection past its maximum length.
    #[error(
        "Too many files: {requested} requested but only {available} of {max} slot(s) remain"
    )]
    QuotaExceeded {
        /// Number of entries in the rejected batch.
        requested: usize,
        /// Free slots at the time of the request.
        available: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A reorder index lies outside the collection.
    #[error("Index {index} is out of range for {len} staged file(s)")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Current collection length.
        len: usize,
    },

    /// A reorder sequence is not a permutation of the staged entries.
    #[error("Reorder rejected: expected a permutation of {expected} entries, got {actual}")]
    NotAPermutation {
        /// Number of staged entries.
        expected: usize,
        /// Number of entries in the proposed sequence.
        actual: usize,
    },

    /// Merge was requested with nothing staged.
    #[error("No files staged for merging")]
    EmptyInput,

    /// A staged payload could not be read or parsed as a document.
    #[error("Unreadable document: {name} ({id})\n  Reason: {reason}")]
    UnreadableDocument {
        /// Id of the offending entry.
        id: EntryId,
        /// Display name of the offending entry.
        name: String,
        /// Reason reported by the reader or codec.
        reason: String,
    },

    /// A staging mutation was attempted while a merge is running.
    #[error("A merge is in progress; staging is locked until it finishes")]
    MergeInProgress,

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Building or serializing the output document failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfStackError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<anyhow::Error> for PdfStackError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(format!("{err:#}"))
    }
}

impl PdfStackError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an UnreadableDocument error.
    pub fn unreadable(id: EntryId, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            id,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an IndexOutOfRange error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if the session stays usable after this error.
    ///
    /// Ingestion rejections exclude the offending files, and merge failures
    /// leave the staged collection untouched, so the user can fix the input
    /// and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidType { .. }
                | Self::TooLarge { .. }
                | Self::QuotaExceeded { .. }
                | Self::EmptyInput
                | Self::UnreadableDocument { .. }
                | Self::MergeInProgress
        )
    }

    /// Check if this error is a broken precondition or ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::NotAPermutation { .. }
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidType { .. } => 3,
            Self::TooLarge { .. } => 3,
            Self::QuotaExceeded { .. } => 3,
            Self::IndexOutOfRange { .. } => 1,
            Self::NotAPermutation { .. } => 1,
            Self::EmptyInput => 1,
            Self::UnreadableDocument { .. } => 3,
            Self::MergeInProgress => 1,
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
