//! Property tests for the ordering, validation and merge invariants.

use pdfstack::config::Limits;
use pdfstack::io::{MemorySource, SourceHandle};
use pdfstack::merge::Merger;
use pdfstack::reorder::move_item;
use pdfstack::staging::StagingStore;
use pdfstack::validation::{RejectionReason, Validator};
use proptest::prelude::*;
use std::sync::Arc;

use crate::common::{page_tags, pdf_source, tags};

fn sized(name: &str, content_type: &str, size: usize) -> SourceHandle {
    Arc::new(MemorySource::new(name, content_type, vec![0; size]))
}

/// A sequence and two valid indices into it.
fn sequence_and_indices() -> impl Strategy<Value = (Vec<u32>, usize, usize)> {
    (1usize..24).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<u32>(), len),
            0..len,
            0..len,
        )
    })
}

proptest! {
    #[test]
    fn move_item_is_a_permutation((items, from, to) in sequence_and_indices()) {
        let moved = move_item(&items, from, to).unwrap();

        let mut before = items.clone();
        let mut after = moved.clone();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
        prop_assert_eq!(moved[to], items[from]);
    }

    #[test]
    fn move_item_to_same_index_is_identity((items, from, _to) in sequence_and_indices()) {
        prop_assert_eq!(move_item(&items, from, from).unwrap(), items);
    }

    #[test]
    fn move_item_keeps_relative_order_of_others((items, from, to) in sequence_and_indices()) {
        let moved = move_item(&items, from, to).unwrap();

        let mut others = items.clone();
        others.remove(from);
        let mut moved_others = moved.clone();
        moved_others.remove(to);
        prop_assert_eq!(others, moved_others);
    }

    #[test]
    fn move_item_never_clamps(len in 0usize..16, extra in 0usize..8) {
        let items: Vec<usize> = (0..len).collect();
        prop_assert!(move_item(&items, len + extra, 0).is_err());
        prop_assert!(move_item(&items, 0, len + extra).is_err());
    }

    #[test]
    fn store_reorder_preserves_ids((_items, from, to) in sequence_and_indices()) {
        let mut store = StagingStore::new(32);
        let batch = (0..=from.max(to))
            .map(|i| sized(&format!("{i}.pdf"), "application/pdf", 1))
            .collect();
        store.append(batch).unwrap();

        let mut before = store.ids();
        let sequence = move_item(store.entries(), from, to).unwrap();
        store.reorder(sequence).unwrap();

        let mut after = store.ids();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn quota_is_all_or_nothing(max in 1usize..20, existing in 0usize..20, batch in 1usize..20) {
        let existing = existing.min(max);
        let limits = Limits::default().with_max_entries(max);
        let validator = Validator::new(limits.clone());

        let mut store = StagingStore::with_limits(&limits);
        let seed = (0..existing)
            .map(|i| sized(&format!("seed{i}.pdf"), "application/pdf", 1))
            .collect();
        store.append(seed).unwrap();

        let candidates: Vec<SourceHandle> = (0..batch)
            .map(|i| sized(&format!("{i}.pdf"), "application/pdf", 1))
            .collect();
        let outcome = validator.validate(candidates, store.len());

        if existing + batch > max {
            prop_assert!(outcome.quota_exceeded());
            prop_assert!(outcome.accepted.is_empty());
            prop_assert_eq!(outcome.rejections.len(), batch);
        } else {
            prop_assert!(!outcome.quota_exceeded());
            prop_assert_eq!(outcome.accepted.len(), batch);
        }

        let _ = store.append(outcome.accepted);
        let expected = if existing + batch > max { existing } else { existing + batch };
        prop_assert_eq!(store.len(), expected);
    }

    #[test]
    fn wrong_type_is_always_rejected(
        content_type in "[a-z]{1,8}/[a-z]{1,8}",
        size in 0usize..64,
    ) {
        prop_assume!(content_type != "application/pdf");
        let validator = Validator::new(Limits::default());

        let outcome = validator.validate(vec![sized("x", &content_type, size)], 0);
        prop_assert!(outcome.accepted.is_empty());
        prop_assert_eq!(outcome.rejections[0].reason, RejectionReason::InvalidType);
    }

    #[test]
    fn oversized_is_always_rejected(ceiling in 1u64..256, over in 1u64..64) {
        let validator = Validator::new(Limits::default().with_max_entry_size(ceiling));
        let size = (ceiling + over) as usize;

        let outcome = validator.validate(vec![sized("x.pdf", "application/pdf", size)], 0);
        prop_assert_eq!(outcome.rejections[0].reason, RejectionReason::TooLarge);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn merge_concatenates_pages(page_counts in prop::collection::vec(0usize..4, 1..5)) {
        let labels = ["A", "B", "C", "D", "E"];
        let mut store = StagingStore::new(10);
        let batch = page_counts
            .iter()
            .zip(labels)
            .map(|(&pages, label)| pdf_source(&format!("{label}.pdf"), label, pages))
            .collect();
        store.append(batch).unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime
            .block_on(Merger::new().merge(store.entries()))
            .unwrap();

        let expected: Vec<String> = page_counts
            .iter()
            .zip(labels)
            .flat_map(|(&pages, label)| tags(label, pages))
            .collect();

        prop_assert_eq!(result.statistics.total_pages, page_counts.iter().sum::<usize>());
        prop_assert_eq!(page_tags(&result.bytes), expected);
    }
}
