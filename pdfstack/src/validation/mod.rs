//! Ingestion-time validation.
//!
//! The validator classifies a batch of raw sources against the configured
//! [`Limits`] without reading any payload. It performs:
//! - A batch-level quota check (all-or-nothing)
//! - A declared content type check
//! - A per-file size ceiling check
//!
//! It has no state and no side effects; reporting the outcome is up to the
//! caller.
//!
//! # Examples
//!
//! ```
//! use pdfstack::config::Limits;
//! use pdfstack::io::{MemorySource, SourceHandle};
//! use pdfstack::validation::{RejectionReason, Validator};
//! use std::sync::Arc;
//!
//! let validator = Validator::new(Limits::default());
//! let batch: Vec<SourceHandle> = vec![
//!     Arc::new(MemorySource::pdf("report.pdf", vec![0; 128])),
//!     Arc::new(MemorySource::new("notes.txt", "text/plain", vec![0; 16])),
//! ];
//!
//! let outcome = validator.validate(batch, 0);
//! assert_eq!(outcome.accepted.len(), 1);
//! assert_eq!(outcome.rejections[0].reason, RejectionReason::InvalidType);
//! ```

use serde::Serialize;

use crate::config::Limits;
use crate::error::{PdfStackError, Result};
use crate::io::{DocumentSource, SourceHandle};

/// Why a candidate was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionReason {
    /// Declared content type is not the accepted type.
    InvalidType,
    /// Payload is larger than the per-entry ceiling.
    TooLarge,
    /// The batch did not fit in the remaining slots.
    QuotaExceeded,
}

/// A rejected candidate with its structured reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Display name of the candidate.
    pub name: String,

    /// Declared content type.
    pub content_type: String,

    /// Declared payload length.
    pub size_bytes: u64,

    /// First rule the candidate failed.
    pub reason: RejectionReason,
}

impl Rejection {
    fn new(candidate: &dyn DocumentSource, reason: RejectionReason) -> Self {
        Self {
            name: candidate.name().to_string(),
            content_type: candidate.content_type().to_string(),
            size_bytes: candidate.size_bytes(),
            reason,
        }
    }
}

/// Details of a batch-level quota breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaBreach {
    /// Batch size.
    pub requested: usize,
    /// Slots free before the batch.
    pub available: usize,
    /// Configured maximum.
    pub max: usize,
}

impl From<QuotaBreach> for PdfStackError {
    fn from(breach: QuotaBreach) -> Self {
        Self::QuotaExceeded {
            requested: breach.requested,
            available: breach.available,
            max: breach.max,
        }
    }
}

/// Classified result of validating one batch.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Accepted candidates, in input order.
    pub accepted: Vec<SourceHandle>,

    /// Rejected candidates, in input order, one per candidate at most.
    pub rejections: Vec<Rejection>,

    /// Set when the whole batch was refused for quota.
    pub quota: Option<QuotaBreach>,
}

impl ValidationOutcome {
    /// True if the batch was refused as a whole.
    pub fn quota_exceeded(&self) -> bool {
        self.quota.is_some()
    }

    /// True if every candidate was accepted.
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Batch validator for ingestion.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    /// Create a validator enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// The limits in force.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Classify a batch given how many entries are already staged.
    ///
    /// If `existing_count + candidates.len()` exceeds the maximum, every
    /// candidate is rejected with [`RejectionReason::QuotaExceeded`],
    /// regardless of whether it would pass the per-file rules. Otherwise
    /// each candidate is checked for type, then size; the first failing
    /// rule is its reason.
    pub fn validate(
        &self,
        candidates: Vec<SourceHandle>,
        existing_count: usize,
    ) -> ValidationOutcome {
        let max = self.limits.max_entries;
        if let Err(breach) = quota_breach(existing_count, candidates.len(), max) {
            tracing::debug!(
                requested = breach.requested,
                available = breach.available,
                "batch rejected for quota"
            );
            return ValidationOutcome {
                accepted: Vec::new(),
                rejections: candidates
                    .iter()
                    .map(|c| Rejection::new(c.as_ref(), RejectionReason::QuotaExceeded))
                    .collect(),
                quota: Some(breach),
            };
        }

        let mut outcome = ValidationOutcome::default();

        for candidate in candidates {
            match self.check_candidate(candidate.as_ref()) {
                Ok(()) => outcome.accepted.push(candidate),
                Err(reason) => {
                    tracing::debug!(name = candidate.name(), ?reason, "candidate rejected");
                    outcome
                        .rejections
                        .push(Rejection::new(candidate.as_ref(), reason));
                }
            }
        }

        outcome
    }

    /// Apply the per-file rules to a single candidate.
    ///
    /// # Errors
    ///
    /// Returns the reason of the first failing rule.
    pub fn check_candidate(
        &self,
        candidate: &dyn DocumentSource,
    ) -> std::result::Result<(), RejectionReason> {
        if candidate.content_type() != self.limits.accepted_type {
            return Err(RejectionReason::InvalidType);
        }

        if candidate.size_bytes() > self.limits.max_entry_size {
            return Err(RejectionReason::TooLarge);
        }

        Ok(())
    }
}

/// Check whether a batch of `batch` entries fits next to `existing` ones.
///
/// # Errors
///
/// Returns [`PdfStackError::QuotaExceeded`] carrying the actual breach if
/// `existing + batch > max`.
pub fn check_quota(existing: usize, batch: usize, max: usize) -> Result<()> {
    quota_breach(existing, batch, max).map_err(PdfStackError::from)
}

fn quota_breach(existing: usize, batch: usize, max: usize) -> std::result::Result<(), QuotaBreach> {
    if existing.saturating_add(batch) > max {
        return Err(QuotaBreach {
            requested: batch,
            available: max.saturating_sub(existing),
            max,
        });
    }
    Ok(())
}
