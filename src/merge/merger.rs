//! Core merge implementation.
//!
//! Sources are loaded concurrently, then grafted under a fresh page tree
//! root: each source keeps its own page tree as a subtree, so inherited
//! attributes (`MediaBox`, `Resources`, `Rotate`) still resolve for every
//! page after the merge.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::collect::InputKind;
use crate::config::MergeConfig;
use crate::error::{PdfMillError, Result};
use crate::io::{LoadResult, LoadedPdf, PdfReader};
use crate::merge::bookmarks::{BookmarkEntry, BookmarkManager};
use crate::merge::metadata::MetadataManager;
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of sources merged.
    pub files_merged: usize,

    /// Number of sources skipped because they failed to load.
    pub files_skipped: usize,

    /// Number of merged sources that were images.
    pub images_converted: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total time taken for the merge, loading included.
    pub merge_time: Duration,

    /// Time taken to load all sources.
    pub load_time: Duration,

    /// Total size of the merged source files.
    pub input_size: u64,

    /// Number of bookmarks added.
    pub bookmarks_added: usize,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Paths of the sources that were merged, in order.
    pub merged_files: Vec<PathBuf>,

    /// Sources skipped with `continue_on_error`, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Merger that combines PDFs and images into one document.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    bookmark_manager: BookmarkManager,
    metadata_manager: MetadataManager,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the inputs of `config` into one document.
    ///
    /// Nothing is written; pass the result to a [`PdfWriter`](crate::io::PdfWriter).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source cannot be loaded and `continue_on_error` is off
    /// - No source could be loaded
    /// - The page trees cannot be combined
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::merge::Merger;
    /// # use pdfmill::config::MergeConfig;
    /// # async fn example(config: MergeConfig) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let result = merger.merge(&config).await?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, config: &MergeConfig) -> Result<MergeResult> {
        self.merge_with_progress(config, |_, _| {}).await
    }

    /// Merge, calling `on_load` with the input index and result of every load.
    pub async fn merge_with_progress<F>(
        &self,
        config: &MergeConfig,
        on_load: F,
    ) -> Result<MergeResult>
    where
        F: FnMut(usize, &LoadResult),
    {
        config.validate()?;
        let merge_start = Instant::now();

        let load_start = Instant::now();
        let results = self
            .reader
            .load_with_progress(&config.inputs, config.effective_jobs(), on_load)
            .await;
        let load_time = load_start.elapsed();

        let mut loaded = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (path, result) in config.inputs.iter().zip(results) {
            match result {
                Ok(pdf) => loaded.push(pdf),
                Err(e) if config.continue_on_error && e.is_recoverable() => {
                    warn!(path = %path.display(), error = %e, "skipping input");
                    skipped.push((path.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        if loaded.is_empty() {
            return Err(PdfMillError::NoFilesToMerge);
        }

        let bookmarks = if config.bookmarks {
            bookmark_entries(&loaded)
        } else {
            Vec::new()
        };
        let input_size = loaded.iter().map(|pdf| pdf.file_size).sum();
        let images_converted = loaded
            .iter()
            .filter(|pdf| pdf.kind == InputKind::Image)
            .count();

        let mut merged_files = Vec::with_capacity(loaded.len());
        let mut documents = Vec::with_capacity(loaded.len());
        for pdf in loaded {
            merged_files.push(pdf.path);
            documents.push(pdf.document);
        }

        let mut document = tokio::task::spawn_blocking(move || merge_documents(documents))
            .await
            .map_err(|e| PdfMillError::merge_failed(format!("Merge task failed: {e}")))??;

        let bookmarks_added = if bookmarks.is_empty() {
            0
        } else {
            self.bookmark_manager.add_bookmarks(&mut document, &bookmarks)?
        };

        if !config.metadata.is_empty() {
            self.metadata_manager
                .set_metadata(&mut document, &config.metadata)?;
        }

        let statistics = MergeStatistics {
            files_merged: merged_files.len(),
            files_skipped: skipped.len(),
            images_converted,
            total_pages: document.get_pages().len(),
            merge_time: merge_start.elapsed(),
            load_time,
            input_size,
            bookmarks_added,
        };

        info!(
            files = statistics.files_merged,
            skipped = statistics.files_skipped,
            pages = statistics.total_pages,
            "merged documents"
        );

        Ok(MergeResult {
            document,
            statistics,
            merged_files,
            skipped,
        })
    }
}

/// One bookmark per source, titled with the file stem and pointing at the
/// first page that source contributes.
fn bookmark_entries(loaded: &[LoadedPdf]) -> Vec<BookmarkEntry> {
    let mut first_page = 1;
    loaded
        .iter()
        .map(|pdf| {
            let entry = BookmarkEntry::new(source_title(&pdf.path), first_page);
            first_page += pdf.page_count as u32;
            entry
        })
        .collect()
}

fn source_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Combine documents in order.
///
/// Every document's page tree root becomes a child of a new root (a single
/// document keeps its own). Source outlines are dropped in both cases, and
/// objects that are no longer reachable are pruned.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    let mut documents = documents.into_iter();
    let Some(mut merged) = documents.next() else {
        return Err(PdfMillError::NoFilesToMerge);
    };

    let first_root = pages_root(&merged)?;
    let mut subtrees = vec![(first_root, merged.get_pages().len())];
    let mut appended = 0;

    for mut doc in documents {
        doc.renumber_objects_with(merged.max_id + 1);
        let root = pages_root(&doc)?;
        subtrees.push((root, doc.get_pages().len()));

        if doc.version > merged.version {
            merged.version = doc.version.clone();
        }
        merged.max_id = doc.max_id;
        merged.objects.extend(doc.objects);
        appended += 1;
    }

    if appended == 0 {
        drop_outline(&mut merged)?;
        merged.prune_objects();
        return Ok(merged);
    }

    let total: usize = subtrees.iter().map(|(_, pages)| pages).sum();
    let new_root = merged.new_object_id();

    for &(root, _) in &subtrees {
        let node = merged
            .get_dictionary_mut(root)
            .map_err(|e| PdfMillError::merge_failed(format!("Failed to get page tree: {e}")))?;
        node.set("Parent", Object::Reference(new_root));
    }

    let kids: Vec<Object> = subtrees
        .iter()
        .map(|&(root, _)| Object::Reference(root))
        .collect();
    merged.objects.insert(
        new_root,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
        }),
    );

    merged
        .catalog_mut()
        .map_err(|e| PdfMillError::merge_failed(format!("Failed to get catalog: {e}")))?
        .set("Pages", Object::Reference(new_root));
    drop_outline(&mut merged)?;

    let pruned = merged.prune_objects();
    debug!(
        sources = subtrees.len(),
        pages = total,
        pruned = pruned.len(),
        "combined page trees"
    );

    let found = merged.get_pages().len();
    if found != total {
        return Err(PdfMillError::merge_failed(format!(
            "Expected {total} pages after merging, found {found}"
        )));
    }

    Ok(merged)
}

/// Remove the source outline; bookmarks are rebuilt per input afterwards.
fn drop_outline(doc: &mut Document) -> Result<()> {
    let catalog = doc
        .catalog_mut()
        .map_err(|e| PdfMillError::merge_failed(format!("Failed to get catalog: {e}")))?;
    catalog.remove(b"Outlines");
    if catalog
        .get(b"PageMode")
        .and_then(Object::as_name)
        .is_ok_and(|mode| mode == b"UseOutlines".as_slice())
    {
        catalog.remove(b"PageMode");
    }
    Ok(())
}

fn pages_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfMillError::merge_failed(format!("Failed to get page tree root: {e}")))
}
