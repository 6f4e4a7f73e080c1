//! Input validation and document information.
//!
//! Backs the `info` command and the dry-run report of `merge`: every source
//! is loaded the same way a merge would load it (images are converted), and
//! described by a serialisable [`PdfInfo`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::validation::Validator;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new();
//! let info = validator.validate_file(Path::new("test.pdf")).await?;
//! println!("{} has {} pages", info.name, info.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::collect::InputKind;
use crate::config::{Metadata, OverwriteMode, resolve_path};
use crate::error::{PdfMillError, Result};
use crate::io::{LoadedPdf, PdfReader, PdfWriter};
use crate::merge::MetadataManager;
use crate::utils::{format_file_size, format_rfc3339};

const MAX_TREE_DEPTH: usize = 64;

/// Width and height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

/// Information about one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    /// Path to the file.
    pub path: PathBuf,

    /// File name.
    pub name: String,

    /// Size of the file in bytes.
    pub file_size: u64,

    /// Last modification time (RFC 3339, UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// PDF or image.
    pub kind: InputKind,

    /// Number of pages.
    pub page_count: usize,

    /// PDF version of the (converted) document.
    pub version: String,

    /// Number of objects in the document.
    pub object_count: usize,

    /// Size of the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_dimensions: Option<PageDimensions>,

    /// Document information dictionary.
    pub metadata: Metadata,
}

impl PdfInfo {
    async fn from_loaded(loaded: &LoadedPdf) -> Self {
        let modified = tokio::fs::metadata(&loaded.path)
            .await
            .and_then(|m| m.modified())
            .ok()
            .map(format_rfc3339);

        let doc = &loaded.document;
        let page_dimensions = doc
            .get_pages()
            .values()
            .next()
            .and_then(|&page_id| page_dimensions(doc, page_id));

        Self {
            path: loaded.path.clone(),
            name: loaded
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_size: loaded.file_size,
            modified,
            kind: loaded.kind,
            page_count: loaded.page_count,
            version: doc.version.clone(),
            object_count: doc.objects.len(),
            page_dimensions,
            metadata: MetadataManager::new().get_metadata(doc),
        }
    }

    /// Format the file size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Summary of validating several files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Information for each file that loaded, in input order.
    pub results: Vec<PdfInfo>,

    /// Files that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,

    /// Total number of pages across all files.
    pub total_pages: usize,

    /// Total file size in bytes.
    pub total_size: u64,

    /// Number of files that passed validation.
    pub files_validated: usize,

    /// Number of files that failed validation.
    pub files_failed: usize,
}

impl ValidationSummary {
    /// Create a summary from validation results.
    pub fn from_results(results: Vec<PdfInfo>, failures: Vec<(PathBuf, String)>) -> Self {
        Self {
            total_pages: results.iter().map(|r| r.page_count).sum(),
            total_size: results.iter().map(|r| r.file_size).sum(),
            files_validated: results.len(),
            files_failed: failures.len(),
            results,
            failures,
        }
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Validator for sources and output paths.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    reader: PdfReader,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one PDF or image and describe it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is a directory
    /// - File is empty
    /// - File is not a valid PDF or image
    /// - PDF is encrypted or has no pages
    pub async fn validate_file(&self, path: &Path) -> Result<PdfInfo> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfMillError::file_not_found(path.to_path_buf())
            } else {
                PdfMillError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if metadata.is_file() && metadata.len() == 0 {
            return Err(PdfMillError::corrupted_pdf(
                path.to_path_buf(),
                "File is empty",
            ));
        }

        let loaded = self.reader.load_source(path).await?;
        Ok(PdfInfo::from_loaded(&loaded).await)
    }

    /// Validate several files in order.
    ///
    /// With `continue_on_error`, recoverable failures are recorded in the
    /// summary instead of stopping.
    ///
    /// # Errors
    ///
    /// Returns the first failure when `continue_on_error` is off, and
    /// [`PdfMillError::NoFilesToMerge`] when nothing validated.
    pub async fn validate_inputs(
        &self,
        paths: &[PathBuf],
        continue_on_error: bool,
    ) -> Result<ValidationSummary> {
        let mut results = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();

        for path in paths {
            match self.validate_file(path).await {
                Ok(info) => results.push(info),
                Err(e) if continue_on_error && e.is_recoverable() => {
                    warn!(path = %path.display(), error = %e, "skipping input");
                    failures.push((path.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        if results.is_empty() {
            return Err(PdfMillError::NoFilesToMerge);
        }

        Ok(ValidationSummary::from_results(results, failures))
    }

    /// Check that `output` can be written under `mode` and is not one of
    /// `inputs`.
    pub async fn validate_output(
        &self,
        output: &Path,
        inputs: &[PathBuf],
        mode: OverwriteMode,
    ) -> Result<()> {
        let resolved = resolve_path(output);
        if inputs.iter().any(|input| resolve_path(input) == resolved) {
            return Err(PdfMillError::invalid_config(format!(
                "Output file cannot be one of the inputs: {}",
                output.display()
            )));
        }

        let writer = PdfWriter::new();
        writer.check_overwrite(output, mode).await?;
        writer.can_write(output).await
    }
}

/// Effective size of a page, following `MediaBox` inheritance.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> Option<PageDimensions> {
    media_box(doc, page_id).map(|[llx, lly, urx, ury]| PageDimensions {
        width: urx - llx,
        height: ury - lly,
    })
}

/// Effective `MediaBox` of a page as `[llx, lly, urx, ury]`, with the
/// corners normalised so the lower left comes first.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(media_box) = node.get(b"MediaBox") {
            let media_box = match media_box {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            let values = media_box
                .as_array()
                .ok()?
                .iter()
                .map(|v| v.as_float().ok())
                .collect::<Option<Vec<f32>>>()?;
            let [x0, y0, x1, y1] = values.get(..4)? else {
                return None;
            };
            return Some([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)]);
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}
