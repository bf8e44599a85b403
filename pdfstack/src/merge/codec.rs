//! The document codec boundary.
//!
//! The merge engine only needs four things from a document format: parse
//! bytes, count content units, append a parsed document's units to an
//! accumulator, and serialize the accumulator. [`DocumentCodec`] captures
//! exactly that, and [`LopdfCodec`] implements it for PDF.

use lopdf::{Document, Object};

use crate::config::CompressionLevel;
use crate::merge::pages::PdfAccumulator;

/// Error raised by a codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not a valid document.
    #[error("{0}")]
    Parse(String),

    /// The accumulator could not take the document.
    #[error("{0}")]
    Structure(String),

    /// Serialization failed.
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl From<lopdf::Error> for CodecError {
    fn from(err: lopdf::Error) -> Self {
        Self::Structure(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

/// Parse, append and serialize operations of one document format.
///
/// Implementations must be cheap to share; the merge engine hands them to
/// blocking worker tasks behind an `Arc`.
pub trait DocumentCodec: Send + Sync + 'static {
    /// A parsed source document.
    type Document: Send + 'static;

    /// The in-progress output document.
    type Accumulator: Send + 'static;

    /// Parse raw bytes.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not a valid document of this format.
    fn parse(&self, bytes: &[u8]) -> Result<Self::Document, CodecError>;

    /// Number of content units (pages) in a parsed document.
    fn unit_count(&self, document: &Self::Document) -> usize;

    /// Start an empty output document.
    fn new_accumulator(&self) -> Self::Accumulator;

    /// Append every content unit of `document`, in its internal order.
    ///
    /// Returns the number of units appended.
    ///
    /// # Errors
    ///
    /// Fails if the document's structure cannot be carried over.
    fn append(
        &self,
        accumulator: &mut Self::Accumulator,
        document: Self::Document,
    ) -> Result<usize, CodecError>;

    /// Serialize the finished output document.
    ///
    /// # Errors
    ///
    /// Fails if the output cannot be written.
    fn serialize(&self, accumulator: Self::Accumulator) -> Result<Vec<u8>, CodecError>;
}

/// PDF codec backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCodec {
    compression: CompressionLevel,
}

impl LopdfCodec {
    /// Create a codec applying `compression` at serialization time.
    pub fn new(compression: CompressionLevel) -> Self {
        Self { compression }
    }

    /// Compression applied at serialization time.
    pub fn compression(&self) -> CompressionLevel {
        self.compression
    }
}

impl DocumentCodec for LopdfCodec {
    type Document = Document;
    type Accumulator = PdfAccumulator;

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        let document = Document::load_mem(bytes).map_err(|e| CodecError::Parse(e.to_string()))?;
        check_page_tree(&document)?;
        Ok(document)
    }

    fn unit_count(&self, document: &Document) -> usize {
        document.get_pages().len()
    }

    fn new_accumulator(&self) -> PdfAccumulator {
        PdfAccumulator::new()
    }

    fn append(
        &self,
        accumulator: &mut PdfAccumulator,
        document: Document,
    ) -> Result<usize, CodecError> {
        accumulator.append(document)
    }

    fn serialize(&self, accumulator: PdfAccumulator) -> Result<Vec<u8>, CodecError> {
        let mut document = accumulator.finish();

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                document.compress();
            }
            CompressionLevel::Maximum => {
                document.prune_objects();
                document.compress();
            }
        }

        document.renumber_objects();

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| CodecError::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}

/// Require the catalog's `/Pages` to resolve to a page tree root.
///
/// `Document::get_pages` yields an empty map for a broken tree, which would
/// otherwise pass as a document with no pages. An empty tree is fine.
fn check_page_tree(document: &Document) -> Result<(), CodecError> {
    let broken = |detail: String| CodecError::Parse(format!("invalid page tree: {detail}"));

    let root_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| broken(format!("trailer /Root: {e}")))?;

    let pages_id = document
        .get_dictionary(root_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| broken(format!("catalog /Pages: {e}")))?;

    let pages = document
        .get_dictionary(pages_id)
        .map_err(|e| broken(format!("object {} {}: {e}", pages_id.0, pages_id.1)))?;

    match pages.get(b"Type").and_then(Object::as_name) {
        Ok(b"Pages") => Ok(()),
        _ => Err(broken(format!(
            "object {} {} is not a /Pages node",
            pages_id.0, pages_id.1
        ))),
    }
}
