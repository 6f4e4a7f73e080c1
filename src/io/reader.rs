//! PDF reading and loading operations.
//!
//! This module provides PDF loading with support for:
//! - Sequential and bounded-parallel loading
//! - Images converted to one-page documents on the fly
//! - Detailed load statistics
//! - Error recovery
//!
//! Parsing is CPU-bound, so every load runs on tokio's blocking pool.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("cover.jpg")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! println!("{} pages", stats.total_pages);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::collect::{InputKind, classify};
use crate::convert::ImageConverter;
use crate::error::{PdfMillError, Result};
use crate::utils::format_file_size;

/// A loaded document with metadata about its source.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Whether the source was a PDF or a converted image.
    pub kind: InputKind,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load (and convert) the document.
    pub load_time: Duration,

    /// Source file size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    async fn new(document: Document, path: PathBuf, kind: InputKind, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        Self {
            document,
            path,
            kind,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of files successfully loaded.
    pub success_count: usize,

    /// Number of files that failed to load.
    pub failure_count: usize,

    /// Number of images converted while loading.
    pub images_converted: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Average time per successful load.
    pub average_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    /// Create statistics from load results.
    pub fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            success_count: 0,
            failure_count: 0,
            images_converted: 0,
            total_time,
            average_time: Duration::ZERO,
            total_size: 0,
            total_pages: 0,
        };
        let mut total_load_time = Duration::ZERO;

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                    stats.total_pages += loaded.page_count;
                    total_load_time += loaded.load_time;
                    if loaded.kind == InputKind::Image {
                        stats.images_converted += 1;
                    }
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        if stats.success_count > 0 {
            stats.average_time = total_load_time / stats.success_count as u32;
        }

        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Loads PDFs and images as documents.
///
/// PDFs without pages are rejected as corrupted.
#[derive(Debug, Clone)]
pub struct PdfReader {
    converter: ImageConverter,
}

impl PdfReader {
    /// Create a new reader with default settings.
    pub fn new() -> Self {
        Self {
            converter: ImageConverter::new(),
        }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is a directory
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages (unless verification is off)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::io::reader::PdfReader;
    /// # use std::path::Path;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load(Path::new("document.pdf")).await?;
    /// println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        check_source(path).await?;

        let start = Instant::now();
        let path_buf = path.to_path_buf();
        let source = path_buf.clone();

        let doc = task::spawn_blocking(move || Document::load(&source))
            .await
            .map_err(|e| PdfMillError::other(format!("Load task failed: {e}")))?
            .map_err(|e| {
                let err_msg = e.to_string();
                if err_msg.contains("encrypt") || err_msg.contains("password") {
                    PdfMillError::encrypted_pdf(path_buf.clone())
                } else {
                    PdfMillError::failed_to_load_pdf(path_buf.clone(), err_msg)
                }
            })?;

        if doc.is_encrypted() {
            return Err(PdfMillError::encrypted_pdf(path_buf));
        }

        if doc.get_pages().is_empty() {
            return Err(PdfMillError::corrupted_pdf(path_buf, "PDF has no pages"));
        }

        let loaded = LoadedPdf::new(doc, path_buf, InputKind::Pdf, start.elapsed()).await;
        debug!(
            path = %loaded.path.display(),
            pages = loaded.page_count,
            elapsed = ?loaded.load_time,
            "loaded pdf"
        );
        Ok(loaded)
    }

    /// Convert an image file to a one-page document.
    pub async fn load_image(&self, path: &Path) -> Result<LoadedPdf> {
        check_source(path).await?;

        let start = Instant::now();
        let converter = self.converter.clone();
        let source = path.to_path_buf();

        let doc = task::spawn_blocking(move || converter.to_document(&source))
            .await
            .map_err(|e| PdfMillError::other(format!("Conversion task failed: {e}")))??;

        let loaded =
            LoadedPdf::new(doc, path.to_path_buf(), InputKind::Image, start.elapsed()).await;
        debug!(path = %loaded.path.display(), elapsed = ?loaded.load_time, "converted image");
        Ok(loaded)
    }

    /// Load a PDF or convert an image, depending on the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMillError::UnsupportedInput`] for any other extension.
    pub async fn load_source(&self, path: &Path) -> Result<LoadedPdf> {
        match classify(path) {
            InputKind::Pdf => self.load(path).await,
            InputKind::Image => self.load_image(path).await,
            InputKind::Other => Err(PdfMillError::unsupported_input(path.to_path_buf())),
        }
    }

    /// Load sources one at a time, in order.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.load_source(path).await);
        }

        results
    }

    /// Load sources concurrently with at most `workers` loads in flight.
    ///
    /// Results come back in the same order as `paths`.
    pub async fn load_parallel(&self, paths: &[PathBuf], workers: usize) -> Vec<LoadResult> {
        self.load_with_progress(paths, workers, |_, _| {}).await
    }

    /// Load all sources, choosing sequential loading for small batches.
    ///
    /// # Returns
    ///
    /// A tuple of (results, statistics) where results holds the outcome for
    /// each path, in input order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::io::reader::PdfReader;
    /// # use std::path::PathBuf;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    ///
    /// let (results, stats) = reader.load_all(&paths, 4).await;
    /// println!("Loaded {} of {} files in {:?}",
    ///          stats.success_count,
    ///          paths.len(),
    ///          stats.total_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if paths.len() <= 3 {
            self.load_sequential(paths).await
        } else {
            self.load_parallel(paths, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }

    /// Load sources concurrently, reporting each result as it is ready.
    ///
    /// `on_progress` receives the input index and the result, always in
    /// input order.
    pub async fn load_with_progress<F>(
        &self,
        paths: &[PathBuf],
        workers: usize,
        mut on_progress: F,
    ) -> Vec<LoadResult>
    where
        F: FnMut(usize, &LoadResult),
    {
        let tasks = paths.iter().map(|path| {
            let reader = self.clone();
            let path = path.clone();
            async move { reader.load_source(&path).await }
        });

        let mut loads = stream::iter(tasks).buffered(workers.max(1));
        let mut results = Vec::with_capacity(paths.len());

        while let Some(result) = loads.next().await {
            on_progress(results.len(), &result);
            results.push(result);
        }

        results
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

async fn check_source(path: &Path) -> Result<()> {
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

    if !metadata.is_file() {
        return Err(PdfMillError::not_a_file(path.to_path_buf()));
    }

    Ok(())
}
