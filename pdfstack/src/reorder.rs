//! Single-element move reordering.
//!
//! A drag gesture, an explicit `FROM:TO` instruction and up/down buttons all
//! reduce to the same pure operation: take the element at one position out
//! and reinsert it at another position of the shortened sequence.

use crate::error::{PdfStackError, Result};

/// Move the element at `source_index` to `target_index`.
///
/// Equivalent to removing the element, then inserting it at `target_index`
/// in the shortened sequence. This is not a swap: moving index 0 to 2 in
/// `[A, B, C, D]` yields `[B, C, A, D]`. Equal indices return the input
/// unchanged. The input itself is never modified.
///
/// # Errors
///
/// Returns [`PdfStackError::IndexOutOfRange`] if either index is outside
/// `items`. Indices are never clamped.
///
/// # Examples
///
/// ```
/// use pdfstack::reorder::move_item;
///
/// let moved = move_item(&['A', 'B', 'C', 'D'], 0, 2).unwrap();
/// assert_eq!(moved, vec!['B', 'C', 'A', 'D']);
///
/// assert!(move_item(&['A'], 0, 1).is_err());
/// ```
pub fn move_item<T: Clone>(
    items: &[T],
    source_index: usize,
    target_index: usize,
) -> Result<Vec<T>> {
    let len = items.len();
    for index in [source_index, target_index] {
        if index >= len {
            return Err(PdfStackError::index_out_of_range(index, len));
        }
    }

    let mut moved = items.to_vec();
    if source_index != target_index {
        let item = moved.remove(source_index);
        moved.insert(target_index, item);
    }

    Ok(moved)
}
