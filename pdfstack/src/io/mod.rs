//! I/O boundaries for pdfstack.
//!
//! This module handles both ends of the pipeline:
//! - Raw document sources handed over at ingestion
//! - Writing merged output to disk
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::{DocumentSource, FileSource, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSource::open(Path::new("input.pdf")).await?;
//! let bytes = source.read_all().await?;
//!
//! let writer = PdfWriter::new();
//! writer.save_bytes(&bytes, Path::new("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod source;
pub mod writer;

pub use source::{DocumentSource, FileSource, MemorySource, SourceHandle};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
