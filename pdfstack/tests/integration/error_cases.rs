//! Integration tests for error handling and edge cases.

use pdfstack::config::Limits;
use pdfstack::error::PdfStackError;
use pdfstack::io::{FileSource, MemorySource, SourceHandle};
use pdfstack::merge::Merger;
use pdfstack::staging::{EntryId, StagingStore};
use pdfstack::validation::{RejectionReason, Validator};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{build_pdf, build_pdf_with_broken_page_tree, pdf_source, tags};

#[tokio::test]
async fn test_error_nonexistent_input() {
    let result = FileSource::open(Path::new("/nonexistent/file.pdf")).await;
    let err = result.unwrap_err();

    assert!(matches!(err, PdfStackError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_empty_merge() {
    let store = StagingStore::default();
    let result = Merger::new().merge(store.entries()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, PdfStackError::EmptyInput));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_error_unreadable_reports_first_offender() {
    let mut store = StagingStore::new(10);
    let ids = store
        .append(vec![
            pdf_source("ok.pdf", "A", 1),
            Arc::new(MemorySource::pdf("bad1.pdf", b"garbage".to_vec())) as SourceHandle,
            Arc::new(MemorySource::pdf("bad2.pdf", b"more garbage".to_vec())) as SourceHandle,
        ])
        .unwrap();

    let err = Merger::new().merge(store.entries()).await.unwrap_err();
    match err {
        PdfStackError::UnreadableDocument { id, name, .. } => {
            assert_eq!(id, ids[1]);
            assert_eq!(name, "bad1.pdf");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_error_broken_page_tree_is_unreadable() {
    let mut store = StagingStore::new(10);
    let ids = store
        .append(vec![
            pdf_source("ok.pdf", "A", 1),
            Arc::new(MemorySource::pdf("tree.pdf", build_pdf_with_broken_page_tree()))
                as SourceHandle,
            Arc::new(MemorySource::pdf("junk.pdf", b"garbage".to_vec())) as SourceHandle,
        ])
        .unwrap();

    let err = Merger::new().merge(store.entries()).await.unwrap_err();
    match err {
        PdfStackError::UnreadableDocument { id, name, reason } => {
            assert_eq!(id, ids[1]);
            assert_eq!(name, "tree.pdf");
            assert!(reason.contains("page tree"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_error_broken_page_tree_alone_is_not_an_empty_document() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![Arc::new(MemorySource::pdf(
            "tree.pdf",
            build_pdf_with_broken_page_tree(),
        )) as SourceHandle])
        .unwrap();

    let result = Merger::new().merge(store.entries()).await;
    assert!(matches!(
        result,
        Err(PdfStackError::UnreadableDocument { .. })
    ));
}

#[tokio::test]
async fn test_zero_page_document_is_accepted() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![pdf_source("empty.pdf", "E", 0), pdf_source("a.pdf", "A", 1)])
        .unwrap();

    let result = Merger::new().merge(store.entries()).await.unwrap();
    assert_eq!(result.statistics.pages_per_entry, vec![0, 1]);
}

#[tokio::test]
async fn test_error_file_removed_after_staging() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("gone.pdf");
    std::fs::write(&path, build_pdf(&tags("G", 1))).unwrap();

    let source = FileSource::open(&path).await.unwrap();
    let mut store = StagingStore::new(10);
    store
        .append(vec![Arc::new(source) as SourceHandle])
        .unwrap();

    std::fs::remove_file(&path).unwrap();

    let result = Merger::new().merge(store.entries()).await;
    assert!(matches!(
        result,
        Err(PdfStackError::UnreadableDocument { .. })
    ));
}

#[test]
fn test_fifty_one_files_rejected_as_a_batch() {
    let limits = Limits::default();
    let validator = Validator::new(limits.clone());
    let mut store = StagingStore::with_limits(&limits);

    let batch: Vec<SourceHandle> = (0..51)
        .map(|i| Arc::new(MemorySource::pdf(format!("{i}.pdf"), vec![0; 8])) as SourceHandle)
        .collect();

    let outcome = validator.validate(batch.clone(), store.len());
    assert!(outcome.quota_exceeded());
    assert!(outcome.accepted.is_empty());
    assert_eq!(store.len(), 0);

    // The store refuses the same batch on its own
    assert!(matches!(
        store.append(batch),
        Err(PdfStackError::QuotaExceeded { requested: 51, .. })
    ));
    assert_eq!(store.len(), 0);
}

#[test]
fn test_invalid_type_leaves_store_unchanged() {
    let validator = Validator::new(Limits::default());
    let mut store = StagingStore::default();
    store.append(vec![pdf_source("a.pdf", "A", 1)]).unwrap();
    let before = store.ids();

    let outcome = validator.validate(
        vec![Arc::new(MemorySource::new("a.png", "image/png", vec![1])) as SourceHandle],
        store.len(),
    );
    store.append(outcome.accepted).unwrap();

    assert_eq!(outcome.rejections[0].reason, RejectionReason::InvalidType);
    assert_eq!(store.ids(), before);
}

#[test]
fn test_remove_unknown_id_from_three() {
    let mut store = StagingStore::new(10);
    store
        .append(vec![
            pdf_source("a.pdf", "A", 1),
            pdf_source("b.pdf", "B", 1),
            pdf_source("c.pdf", "C", 1),
        ])
        .unwrap();

    assert!(store.remove_by_id(&EntryId::generate()).is_none());
    assert_eq!(store.len(), 3);
}
