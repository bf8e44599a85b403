//! PDF merge operations.
//!
//! This module turns an ordered list of staged entries into one output
//! document:
//! - [`codec`]: the parse/append/serialize boundary and its `lopdf` backend
//! - [`pages`]: page tree assembly for the PDF accumulator
//! - [`merger`]: the sequential merge loop, statistics and output naming

pub mod codec;
pub mod merger;
pub mod pages;

pub use codec::{CodecError, DocumentCodec, LopdfCodec};
pub use merger::{MergeResult, MergeStatistics, Merger, PlannedEntry, output_filename};
pub use pages::PdfAccumulator;
