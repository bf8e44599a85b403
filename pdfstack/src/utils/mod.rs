//! Utilities for path collection and size formatting.

use crate::{Result, error::PdfStackError};
use std::path::PathBuf;

const GLOB_METACHARACTERS: &[char] = &['*', '?', '['];

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths, pattern by pattern, so the
/// command-line order becomes the staging order. A pattern without glob
/// metacharacters is kept verbatim even if it does not exist; opening it
/// later reports the missing file.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
/// - A wildcard pattern that matches nothing is an error.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let pattern = pattern.as_ref();

    if !pattern.contains(GLOB_METACHARACTERS) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfStackError::Other {
        message: format!("Invalid pattern {pattern}: {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfStackError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() {
        return Err(PdfStackError::other(format!(
            "No files match pattern: {pattern}"
        )));
    }

    Ok(resolved_paths)
}

/// Format a byte count as a human-readable string.
///
/// ```
/// use pdfstack::utils::format_file_size;
///
/// assert_eq!(format_file_size(500), "500 bytes");
/// assert_eq!(format_file_size(2048), "2.00 KB");
/// ```
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
