//! Page extraction and rotation.
//!
//! Spans are 1-based and inclusive, matching what users type. Extraction
//! keeps the source's page tree (intermediate nodes and inherited attributes
//! included) and deletes the pages outside the span.

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::config::{PageSpan, Rotation};
use crate::error::{PdfMillError, Result};

/// Maximum depth followed when looking up inherited page attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Page extractor for manipulating pages in PDFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageExtractor;

impl PageExtractor {
    /// Create a new page extractor.
    pub fn new() -> Self {
        Self
    }

    /// Get the number of pages in a document.
    pub fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }

    /// Object ids of the pages in `span`, in page order.
    pub fn page_ids(&self, doc: &Document, span: PageSpan) -> Result<Vec<ObjectId>> {
        let pages = doc.get_pages();
        self.ensure_in_document(span, pages.len())?;

        Ok(span.pages().filter_map(|n| pages.get(&n).copied()).collect())
    }

    /// Copy pages `span.start()..=span.end()` into a new document.
    ///
    /// Objects only reachable from removed pages are pruned. The outline is
    /// dropped, since its entries may point at pages that no longer exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::pages::PageExtractor;
    /// # use pdfmill::config::PageSpan;
    /// # use lopdf::Document;
    /// # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let extractor = PageExtractor::new();
    /// let span = PageSpan::parse("41-44")?;
    /// let extracted = extractor.extract_span(&doc, span)?;
    /// assert_eq!(extractor.page_count(&extracted), 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract_span(&self, doc: &Document, span: PageSpan) -> Result<Document> {
        let total = self.page_count(doc);
        self.ensure_in_document(span, total)?;

        let unwanted: Vec<u32> = (1..=total as u32).filter(|&n| !span.contains(n)).collect();

        let mut extracted = doc.clone();
        if !unwanted.is_empty() {
            extracted.delete_pages(&unwanted);
        }

        if let Ok(catalog) = extracted.catalog_mut() {
            catalog.remove(b"Outlines");
        }
        let pruned = extracted.prune_objects();

        let remaining = self.page_count(&extracted);
        if remaining != span.len() {
            return Err(PdfMillError::page_operation_failed(format!(
                "Expected {} pages after extracting {span}, found {remaining}",
                span.len()
            )));
        }

        debug!(%span, pruned = pruned.len(), "extracted pages");
        Ok(extracted)
    }

    /// Add `rotation` to every page in `span`.
    ///
    /// The page's effective rotation (its own `/Rotate`, or the one inherited
    /// from the page tree) is the starting point; the result is written on
    /// the page itself, normalised into `0..360`.
    ///
    /// Returns the number of pages rotated.
    pub fn rotate_span(
        &self,
        doc: &mut Document,
        span: PageSpan,
        rotation: Rotation,
    ) -> Result<usize> {
        let page_ids = self.page_ids(doc, span)?;

        for &page_id in &page_ids {
            self.rotate_page(doc, page_id, rotation.as_degrees())?;
        }

        debug!(%span, degrees = rotation.as_degrees(), "rotated pages");
        Ok(page_ids.len())
    }

    /// Current rotation of a page in degrees, including inherited values.
    pub fn rotation_of(&self, doc: &Document, page_id: ObjectId) -> i64 {
        let mut node_id = page_id;

        for _ in 0..MAX_TREE_DEPTH {
            let Ok(node) = doc.get_dictionary(node_id) else {
                break;
            };
            if let Ok(rotate) = node.get(b"Rotate").and_then(Object::as_i64) {
                return rotate.rem_euclid(360);
            }
            match node.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => node_id = parent,
                Err(_) => break,
            }
        }

        0
    }

    fn rotate_page(&self, doc: &mut Document, page_id: ObjectId, degrees: i64) -> Result<()> {
        let rotated = (self.rotation_of(doc, page_id) + degrees).rem_euclid(360);

        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| PdfMillError::page_operation_failed(format!("Failed to get page: {e}")))?;
        page.set("Rotate", Object::Integer(rotated));

        Ok(())
    }

    fn ensure_in_document(&self, span: PageSpan, total: usize) -> Result<()> {
        if span.end() as usize > total {
            return Err(PdfMillError::page_operation_failed(format!(
                "Page range {span} is outside the document ({total} pages)"
            )));
        }
        Ok(())
    }
}
