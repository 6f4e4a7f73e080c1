//! Bookmark (outline) management for merged documents.
//!
//! One top-level outline item per merged source, pointing at the first page
//! that source contributed.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{PdfMillError, Result};
use crate::utils::text_string;

/// One outline entry: a title and the 1-based page it jumps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Text shown in the outline.
    pub title: String,

    /// Target page number (1-based).
    pub page: u32,
}

impl BookmarkEntry {
    /// Create an entry.
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// Manager for PDF bookmarks (outlines).
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Replace the document outline with one item per entry.
    ///
    /// Entries pointing past the last page are skipped. Returns the number
    /// of items created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::merge::bookmarks::{BookmarkEntry, BookmarkManager};
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = BookmarkManager::new();
    /// let entries = vec![BookmarkEntry::new("Intro", 1), BookmarkEntry::new("Appendix", 12)];
    /// manager.add_bookmarks(&mut doc, &entries)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_bookmarks(&self, doc: &mut Document, entries: &[BookmarkEntry]) -> Result<usize> {
        let pages = doc.get_pages();

        let items: Vec<(&str, ObjectId)> = entries
            .iter()
            .filter_map(|entry| {
                pages
                    .get(&entry.page)
                    .map(|&page_id| (entry.title.as_str(), page_id))
            })
            .collect();

        if items.is_empty() {
            return Ok(0);
        }

        self.create_outline(doc, &items)?;
        Ok(items.len())
    }

    fn create_outline(&self, doc: &mut Document, items: &[(&str, ObjectId)]) -> Result<()> {
        let outline_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

        for (idx, ((title, page_id), &item_id)) in items.iter().zip(&item_ids).enumerate() {
            let mut item = Dictionary::new();
            item.set("Title", text_string(title));
            item.set("Parent", Object::Reference(outline_id));
            item.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(*page_id),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ]),
            );
            if idx > 0 {
                item.set("Prev", Object::Reference(item_ids[idx - 1]));
            }
            if let Some(&next) = item_ids.get(idx + 1) {
                item.set("Next", Object::Reference(next));
            }

            doc.objects.insert(item_id, Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", Object::Integer(item_ids.len() as i64));
        if let (Some(&first), Some(&last)) = (item_ids.first(), item_ids.last()) {
            outline.set("First", Object::Reference(first));
            outline.set("Last", Object::Reference(last));
        }
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        let catalog = doc.catalog_mut().map_err(|e| PdfMillError::BookmarkFailed {
            reason: format!("Failed to get catalog: {e}"),
        })?;
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        Ok(())
    }
}
