//! Raw document sources.
//!
//! A source is what the presentation layer hands over at ingestion: a name,
//! a declared content type, a byte length, and a way to fetch the payload.
//! Validation only looks at the first three; the payload is read lazily by
//! the merge engine.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::{DocumentSource, FileSource};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSource::open(Path::new("chapter1.pdf")).await?;
//! println!("{} ({}, {} bytes)", source.name(), source.content_type(), source.size_bytes());
//! let bytes = source.read_all().await?;
//! # Ok(())
//! # }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::PDF_MIME_TYPE;
use crate::error::{PdfStackError, Result};

/// Content type declared for files whose extension is not recognised.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A raw input document as seen by the ingestion pipeline.
pub trait DocumentSource: Send + Sync + fmt::Debug {
    /// Human-readable name, informational only.
    fn name(&self) -> &str;

    /// Declared content type.
    fn content_type(&self) -> &str;

    /// Payload length in bytes, known without reading the payload.
    fn size_bytes(&self) -> u64;

    /// Read the full payload.
    fn read_all(&self) -> BoxFuture<'_, io::Result<Vec<u8>>>;
}

/// Shared handle to a raw source, kept by staged entries until merge time.
pub type SourceHandle = Arc<dyn DocumentSource>;

/// Declare a content type from a path's extension.
///
/// Only `.pdf` (any case) maps to the PDF type; everything else is an
/// opaque byte stream.
pub fn content_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME_TYPE,
        _ => OCTET_STREAM,
    }
}

/// A document backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    content_type: &'static str,
    size: u64,
}

impl FileSource {
    /// Stat a file and capture its name, declared type and size.
    ///
    /// The payload is not read.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path is not a regular file
    /// - The file metadata cannot be read
    pub async fn open(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                PdfStackError::file_not_found(path.to_path_buf())
            } else {
                PdfStackError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(PdfStackError::not_a_file(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            content_type: content_type_for_path(path),
            size: metadata.len(),
        })
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        self.content_type
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    fn read_all(&self) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        tokio::fs::read(&self.path).boxed()
    }
}

/// A document held in memory.
#[derive(Clone)]
pub struct MemorySource {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl MemorySource {
    /// Create a source with an explicit content type.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Create a source declared as a PDF document.
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, PDF_MIME_TYPE, bytes)
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_all(&self) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        let bytes = self.bytes.to_vec();
        async move { Ok(bytes) }.boxed()
    }
}
