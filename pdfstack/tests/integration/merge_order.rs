//! Integration tests for merge output order and content.

use chrono::NaiveDate;
use lopdf::{Document, Object};
use pdfstack::config::CompressionLevel;
use pdfstack::merge::Merger;
use pdfstack::staging::StagingStore;
use rstest::rstest;

use crate::common::{page_tags, pdf_source, tags};

#[tokio::test]
async fn test_merge_three_and_two_pages() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![pdf_source("a.pdf", "A", 3), pdf_source("b.pdf", "B", 2)])
        .unwrap();

    let result = Merger::new().merge(store.entries()).await.unwrap();

    assert_eq!(
        page_tags(&result.bytes),
        vec!["A.p1", "A.p2", "A.p3", "B.p1", "B.p2"]
    );
    assert_eq!(result.statistics.total_pages, 5);
    assert_eq!(result.statistics.pages_per_entry, vec![3, 2]);
    assert_eq!(result.mime_type(), "application/pdf");
    assert!(result.filename.starts_with("merged-pdf-"));
    assert!(result.filename.ends_with(".pdf"));
}

#[tokio::test]
async fn test_reordered_entries_merge_in_new_order() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![
            pdf_source("a.pdf", "A", 1),
            pdf_source("b.pdf", "B", 2),
            pdf_source("c.pdf", "C", 1),
        ])
        .unwrap();

    let sequence = pdfstack::reorder::move_item(store.entries(), 0, 2).unwrap();
    store.reorder(sequence).unwrap();

    let result = Merger::new().merge(store.entries()).await.unwrap();
    assert_eq!(page_tags(&result.bytes), vec!["B.p1", "B.p2", "C.p1", "A.p1"]);
}

#[tokio::test]
async fn test_same_document_twice() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![pdf_source("a.pdf", "A", 2), pdf_source("a.pdf", "A", 2)])
        .unwrap();

    let result = Merger::new().merge(store.entries()).await.unwrap();
    assert_eq!(page_tags(&result.bytes), vec!["A.p1", "A.p2", "A.p1", "A.p2"]);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_every_compression_level_keeps_pages(#[case] compression: CompressionLevel) {
    let mut store = StagingStore::new(10);
    store
        .append(vec![pdf_source("a.pdf", "A", 2), pdf_source("b.pdf", "B", 1)])
        .unwrap();

    let result = Merger::with_compression(compression)
        .merge(store.entries())
        .await
        .unwrap();

    assert_eq!(page_tags(&result.bytes), vec!["A.p1", "A.p2", "B.p1"]);
}

#[tokio::test]
async fn test_inherited_page_attributes_survive() {
    let mut store = StagingStore::new(10);
    store.append(vec![pdf_source("a.pdf", "A", 2)]).unwrap();

    let result = Merger::new().merge(store.entries()).await.unwrap();
    let doc = Document::load_mem(&result.bytes).unwrap();

    for page_id in doc.get_pages().into_values() {
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        let resources = page.get(b"Resources").and_then(Object::as_dict).unwrap();
        assert!(resources.has(b"Font"));
    }
}

#[tokio::test]
async fn test_merge_on_fixed_date() {
    let mut store = StagingStore::new(10);
    store.append(vec![pdf_source("a.pdf", "A", 1)]).unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let result = Merger::new().merge_on(store.entries(), date).await.unwrap();
    assert_eq!(result.filename, "merged-pdf-2025-12-31.pdf");
}

#[tokio::test]
async fn test_plan_matches_merge() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![pdf_source("a.pdf", "A", 4), pdf_source("b.pdf", "B", 1)])
        .unwrap();

    let merger = Merger::new();
    let planned = merger.plan(store.entries()).await.unwrap();
    let pages: Vec<_> = planned.iter().map(|p| p.pages).collect();
    assert_eq!(pages, vec![4, 1]);

    let result = merger.merge(store.entries()).await.unwrap();
    assert_eq!(result.statistics.pages_per_entry, pages);
    assert_eq!(page_tags(&result.bytes).len(), tags("A", 4).len() + 1);
}
