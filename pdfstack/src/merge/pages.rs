//! Page tree assembly for merged PDFs.
//!
//! Every source document is renumbered past the accumulator's highest
//! object id, so the two object spaces never collide. Its pages are then
//! re-parented under one output page tree, in the source's own page order.
//! Attributes a page inherits from its ancestors in the source tree are
//! copied onto the page first, because those ancestors do not survive.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::merge::codec::CodecError;

/// Page attributes a page may inherit from its page tree ancestors.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// The in-progress output document.
#[derive(Debug)]
pub struct PdfAccumulator {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PdfAccumulator {
    /// Start an empty output document with a reserved page tree root.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append every page of `source`, in order.
    ///
    /// Returns the number of pages appended.
    ///
    /// # Errors
    ///
    /// Fails if a page object is missing or is not a dictionary.
    pub fn append(&mut self, mut source: Document) -> Result<usize, CodecError> {
        source.renumber_objects_with(self.document.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

        for &page_id in &page_ids {
            let inherited = inherited_attributes(&source, page_id)?;
            let page = source
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| {
                    CodecError::Structure(format!("page {} {}: {e}", page_id.0, page_id.1))
                })?;

            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", Object::Reference(self.pages_id));
        }

        self.document.max_id = self.document.max_id.max(source.max_id);
        if source.version > self.document.version {
            self.document.version = source.version.clone();
        }

        self.document.objects.extend(
            source
                .objects
                .into_iter()
                .filter(|(_, object)| !is_tree_node(object)),
        );

        let appended = page_ids.len();
        self.kids.extend(page_ids);
        Ok(appended)
    }

    /// Close the page tree, add a catalog and hand back the document.
    pub fn finish(self) -> Document {
        let Self {
            mut document,
            pages_id,
            kids,
        } = self;

        let count = kids.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            (
                "Kids",
                Object::Array(kids.into_iter().map(Object::Reference).collect()),
            ),
            ("Count", Object::Integer(count)),
        ]);
        document
            .objects
            .insert(pages_id, Object::Dictionary(pages));

        let catalog_id = document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        document.trailer.set("Root", catalog_id);

        document
    }
}

impl Default for PdfAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect the inheritable attributes a page lacks but an ancestor defines.
///
/// The nearest ancestor wins. A broken or cyclic parent chain ends the walk.
fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(&'static [u8], Object)>, CodecError> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| CodecError::Structure(format!("page {} {}: {e}", page_id.0, page_id.1)))?;

    let mut missing: Vec<&'static [u8]> = INHERITABLE_ATTRIBUTES
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut visited = vec![page_id];
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(parent_id) = parent {
        if missing.is_empty() || visited.contains(&parent_id) {
            break;
        }
        visited.push(parent_id);

        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}

/// True for source catalogs and intermediate page tree nodes.
fn is_tree_node(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };

    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog" | b"Pages")
    )
}
