//! pdfstack - Stage, reorder and merge PDF documents.
//!
//! This library holds the ordered-staging-and-merge pipeline behind the
//! `pdfstack` command line tool. It provides:
//!
//! - Ingestion-time validation of declared type, size and batch quota
//! - An ordered, uniquely keyed staging store
//! - A pure single-element move reorder engine
//! - A sequential merge engine over a pluggable document codec
//! - A session that ties the pieces together behind a processing flag
//!
//! # Examples
//!
//! ## Stage, reorder and merge
//!
//! ```no_run
//! use pdfstack::config::Limits;
//! use pdfstack::io::{FileSource, SourceHandle};
//! use pdfstack::notify::NoopNotifier;
//! use pdfstack::session::Session;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(Limits::default(), NoopNotifier);
//!
//! let batch: Vec<SourceHandle> = vec![
//!     Arc::new(FileSource::open(Path::new("a.pdf")).await?),
//!     Arc::new(FileSource::open(Path::new("b.pdf")).await?),
//! ];
//! session.ingest(batch)?;
//! session.move_entry(1, 0)?;
//!
//! let result = session.merge().await?;
//! println!("{} ({} pages)", result.filename, result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfstack::config::Limits;
//! use pdfstack::io::{MemorySource, SourceHandle};
//! use pdfstack::merge::Merger;
//! use pdfstack::staging::StagingStore;
//! use pdfstack::validation::Validator;
//! use std::sync::Arc;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let limits = Limits::default();
//! let validator = Validator::new(limits.clone());
//! let mut store = StagingStore::with_limits(&limits);
//!
//! let candidate: SourceHandle = Arc::new(MemorySource::pdf("report.pdf", bytes));
//! let outcome = validator.validate(vec![candidate], store.len());
//! store.append(outcome.accepted)?;
//!
//! let result = Merger::new().merge(store.entries()).await?;
//! println!("{} bytes", result.bytes.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod notify;
pub mod reorder;
pub mod session;
pub mod staging;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, Limits};
pub use error::{PdfStackError, Result};
pub use merge::{MergeResult, Merger};
pub use session::Session;
pub use staging::{EntryId, StagedEntry, StagingStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// MIME type of the documents this library stages and produces.
pub const PDF_MIME_TYPE: &str = "application/pdf";
