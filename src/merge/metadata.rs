//! PDF metadata management.
//!
//! Reads and writes the document Info dictionary: title, author, subject and
//! keywords, plus the producer and modification date stamped on output.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::time::SystemTime;

use crate::config::Metadata;
use crate::error::{PdfMillError, Result};
use crate::utils::{decode_text_string, format_pdf_date, text_string};

/// Producer string written into output documents.
const PRODUCER: &str = concat!("pdfmill ", env!("CARGO_PKG_VERSION"));

/// Manager for PDF metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Set metadata on a document.
    ///
    /// Only the fields present in `metadata` are replaced; other entries of
    /// an existing Info dictionary are kept. Producer and modification date
    /// are always updated.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::merge::metadata::MetadataManager;
    /// # use pdfmill::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = MetadataManager::new();
    /// let metadata = Metadata::new(
    ///     Some("Tax return 2023".to_string()),
    ///     Some("Jane Doe".to_string()),
    ///     None,
    ///     None,
    /// );
    /// manager.set_metadata(&mut doc, &metadata)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        let info_id = self.info_id(doc);
        let info = info_dictionary(doc, info_id)?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        let now = format_pdf_date(SystemTime::now());
        if !info.has(b"CreationDate") {
            info.set("CreationDate", text_string(&now));
        }
        info.set("ModDate", text_string(&now));
        info.set("Producer", text_string(PRODUCER));

        Ok(())
    }

    /// Get metadata from a document.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = self.info(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            get_string_field(info, b"Title"),
            get_string_field(info, b"Author"),
            get_string_field(info, b"Subject"),
            get_string_field(info, b"Keywords"),
        )
    }

    /// Read an arbitrary text entry (e.g. `Producer`) of the Info dictionary.
    pub fn get_field(&self, doc: &Document, key: &str) -> Option<String> {
        self.info(doc)
            .and_then(|info| get_string_field(info, key.as_bytes()))
    }

    /// Clear all metadata from a document.
    pub fn clear_metadata(&self, doc: &mut Document) {
        if let Ok(info_id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
            doc.objects.remove(&info_id);
        }
        doc.trailer.remove(b"Info");
    }

    /// Check if a document has metadata.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        doc.trailer.has(b"Info")
    }

    fn info<'a>(&self, doc: &'a Document) -> Option<&'a Dictionary> {
        match doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn info_id(&self, doc: &mut Document) -> ObjectId {
        if let Ok(id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
            return id;
        }

        // A direct Info dictionary is moved into its own object.
        let existing = match doc.trailer.get(b"Info") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let id = doc.add_object(existing);
        doc.trailer.set("Info", Object::Reference(id));
        id
    }
}

fn info_dictionary(doc: &mut Document, info_id: ObjectId) -> Result<&mut Dictionary> {
    if doc.get_dictionary(info_id).is_err() {
        doc.objects
            .insert(info_id, Object::Dictionary(Dictionary::new()));
    }

    doc.get_dictionary_mut(info_id)
        .map_err(|e| PdfMillError::MetadataFailed {
            reason: format!("Failed to access Info dictionary: {e}"),
        })
}

fn get_string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}
