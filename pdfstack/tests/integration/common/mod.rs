//! Shared fixtures for the integration tests.
//!
//! PDFs are built in memory. Every page carries a `/Tag` name such as
//! `A.p2`, so the page order of a merged document can be read back.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use pdfstack::io::{MemorySource, SourceHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tags `"{label}.p1"` to `"{label}.p{pages}"`.
pub fn tags(label: &str, pages: usize) -> Vec<String> {
    (1..=pages).map(|n| format!("{label}.p{n}")).collect()
}

/// Build a PDF with one page per tag.
///
/// MediaBox and Resources live on the page tree root, so every page
/// inherits them.
pub fn build_pdf(tags: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = tags
        .iter()
        .map(|tag| {
            let content = format!("BT /F1 24 Tf 72 720 Td ({tag}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Tag" => Object::Name(tag.as_bytes().to_vec()),
            });
            page_id.into()
        })
        .collect();

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => tags.len() as i64,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    };
    doc.objects.insert(pages_id, pages.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Build a PDF whose catalog `/Pages` points at a font instead of a page tree.
pub fn build_pdf_with_broken_page_tree() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => font_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// In-memory PDF source named `name` with `pages` tagged pages.
pub fn pdf_source(name: &str, label: &str, pages: usize) -> SourceHandle {
    Arc::new(MemorySource::pdf(name, build_pdf(&tags(label, pages))))
}

/// Write a tagged PDF into `dir`.
pub fn write_pdf(dir: &Path, name: &str, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(&tags(label, pages))).unwrap();
    path
}

/// Page tags of a serialized PDF, in page order.
pub fn page_tags(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let tag = page.get(b"Tag").and_then(Object::as_name).unwrap();
            String::from_utf8_lossy(tag).into_owned()
        })
        .collect()
}
