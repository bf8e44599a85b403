//! Integration tests for a full staging session driven from disk.

use pdfstack::config::Limits;
use pdfstack::io::{FileSource, MemorySource, PdfWriter, SourceHandle};
use pdfstack::notify::{CollectingNotifier, MergeFailureKind, Notice};
use pdfstack::session::Session;
use pdfstack::validation::RejectionReason;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{page_tags, pdf_source, write_pdf};

#[tokio::test]
async fn test_stage_from_disk_reorder_merge_and_write() {
    let temp_dir = TempDir::new().unwrap();
    let paths = [
        write_pdf(temp_dir.path(), "a.pdf", "A", 2),
        write_pdf(temp_dir.path(), "b.pdf", "B", 1),
        write_pdf(temp_dir.path(), "c.pdf", "C", 3),
    ];

    let mut batch: Vec<SourceHandle> = Vec::new();
    for path in &paths {
        batch.push(Arc::new(FileSource::open(path).await.unwrap()));
    }

    let notifier = CollectingNotifier::new();
    let mut session = Session::new(Limits::default(), notifier.clone());

    let report = session.ingest(batch).unwrap();
    assert_eq!(report.added.len(), 3);

    session.remove(&report.added[1]).unwrap();
    session.move_entry(1, 0).unwrap();

    let result = session.merge().await.unwrap();
    assert_eq!(
        page_tags(&result.bytes),
        vec!["C.p1", "C.p2", "C.p3", "A.p1", "A.p2"]
    );

    let output = temp_dir.path().join(&result.filename);
    let stats = PdfWriter::new().save(&result, &output).await.unwrap();
    assert_eq!(stats.file_size, result.bytes.len() as u64);
    assert_eq!(page_tags(&std::fs::read(&output).unwrap()).len(), 5);

    assert_eq!(
        notifier.last(),
        Some(Notice::MergeCompleted {
            filename: result.filename.clone(),
            pages: 5
        })
    );

    // The session is still usable after a merge
    assert_eq!(session.store().len(), 2);
    assert!(!session.is_processing());
}

#[tokio::test]
async fn test_wrong_extension_is_rejected_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let text = temp_dir.path().join("notes.txt");
    std::fs::write(&text, b"hello").unwrap();
    let pdf = write_pdf(temp_dir.path(), "doc.PDF", "D", 1);

    let batch: Vec<SourceHandle> = vec![
        Arc::new(FileSource::open(&text).await.unwrap()),
        Arc::new(FileSource::open(&pdf).await.unwrap()),
    ];

    let mut session = Session::new(Limits::default(), CollectingNotifier::new());
    let report = session.ingest(batch).unwrap();

    assert_eq!(report.added.len(), 1);
    assert_eq!(report.rejections[0].name, "notes.txt");
    assert_eq!(report.rejections[0].reason, RejectionReason::InvalidType);
    assert_eq!(session.store().entries()[0].display_name(), "doc.PDF");
}

#[tokio::test]
async fn test_size_ceiling_override() {
    let limits = Limits::default().with_max_entry_size(64);
    let mut session = Session::new(limits, CollectingNotifier::new());

    let report = session
        .ingest(vec![
            Arc::new(MemorySource::pdf("tiny.pdf", vec![0; 64])) as SourceHandle,
            pdf_source("real.pdf", "R", 1),
        ])
        .unwrap();

    assert_eq!(report.added.len(), 1);
    assert_eq!(report.rejections[0].name, "real.pdf");
    assert_eq!(report.rejections[0].reason, RejectionReason::TooLarge);
}

#[tokio::test]
async fn test_failed_merge_can_be_retried_after_removal() {
    let notifier = CollectingNotifier::new();
    let mut session = Session::new(Limits::default(), notifier.clone());

    let report = session
        .ingest(vec![
            pdf_source("a.pdf", "A", 1),
            Arc::new(MemorySource::pdf("broken.pdf", b"this is not a pdf".to_vec()))
                as SourceHandle,
            pdf_source("b.pdf", "B", 1),
        ])
        .unwrap();

    assert!(session.merge().await.is_err());
    assert_eq!(session.store().ids(), report.added);
    assert_eq!(
        notifier.last(),
        Some(Notice::MergeFailed {
            reason: MergeFailureKind::UnreadableDocument,
            entry: Some(report.added[1]),
            name: Some("broken.pdf".to_string())
        })
    );

    session.remove(&report.added[1]).unwrap();
    let result = session.merge().await.unwrap();
    assert_eq!(page_tags(&result.bytes), vec!["A.p1", "B.p1"]);
}

#[tokio::test]
async fn test_clear_then_merge_is_empty_input() {
    let mut session = Session::new(Limits::default(), CollectingNotifier::new());
    session.ingest(vec![pdf_source("a.pdf", "A", 1)]).unwrap();

    assert_eq!(session.clear().unwrap(), 1);
    assert!(matches!(
        session.merge().await,
        Err(pdfstack::PdfStackError::EmptyInput)
    ));
}
