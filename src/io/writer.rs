//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to a temporary sibling, then rename)
//! - Compression levels
//! - Overwrite protection
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::config::{CompressionLevel, OverwriteMode};
use crate::error::{PdfMillError, Result};
use crate::utils::format_file_size;

const BUFFER_SIZE: usize = 64 * 1024;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression that was applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer.
///
/// Every write renumbers objects, creates missing parent directories and
/// goes through a temporary sibling that is renamed into place.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    compression: CompressionLevel,
}

impl PdfWriter {
    /// Create a new PDF writer with standard compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given compression level.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Save a PDF document to a file.
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// The document is cloned; compression and renumbering only affect the
    /// written copy.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - The file cannot be created or written
    /// - The final rename fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::io::writer::PdfWriter;
    /// # use lopdf::Document;
    /// # use std::path::Path;
    /// # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer.save_with_stats(&doc, Path::new("output.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let compression = self.compression;
        let doc = doc.clone();

        let stats = task::spawn_blocking(move || write_document(doc, path_buf, compression))
            .await
            .map_err(|e| PdfMillError::other(format!("Write task failed: {e}")))??;

        debug!(
            path = %stats.output_path.display(),
            size = stats.file_size,
            elapsed = ?stats.write_time,
            "wrote pdf"
        );
        Ok(stats)
    }

    /// Check an output path against the overwrite mode.
    ///
    /// Only [`OverwriteMode::NoClobber`] refuses an existing file here;
    /// prompting is up to the caller, before the write starts.
    pub async fn check_overwrite(&self, path: &Path, mode: OverwriteMode) -> Result<()> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => Err(PdfMillError::invalid_config(format!(
                "Output path is a directory: {}",
                path.display()
            ))),
            Ok(_) if mode == OverwriteMode::NoClobber => {
                Err(PdfMillError::output_exists(path.to_path_buf()))
            }
            _ => Ok(()),
        }
    }

    /// Check if a file can be written to the given path.
    ///
    /// A missing parent directory is fine, since the writer creates it; a
    /// read-only one is not.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        match tokio::fs::metadata(parent).await {
            Ok(metadata) if metadata.permissions().readonly() => {
                Err(PdfMillError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PdfMillError::FileNotAccessible {
                path: parent.to_path_buf(),
                source: e,
            }),
        }
    }
}

fn write_document(
    mut doc: Document,
    path: PathBuf,
    compression: CompressionLevel,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    match compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            doc.prune_objects();
            doc.compress();
        }
    }

    doc.renumber_objects();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PdfMillError::FailedToCreateOutput {
            path: path.clone(),
            source: e,
        })?;
    }

    let write_path = temp_path_for(&path);
    let result = write_to(&mut doc, &write_path).and_then(|()| {
        std::fs::rename(&write_path, &path).map_err(|e| PdfMillError::FailedToWrite {
            path: path.clone(),
            source: e,
        })
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&write_path);
    }
    result?;

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
        compression,
    })
}

fn write_to(doc: &mut Document, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PdfMillError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(BUFFER_SIZE, file);

    doc.save_to(&mut writer)
        .map_err(|e| PdfMillError::FailedToWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| PdfMillError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Hidden sibling used for atomic writes: `out/.report.pdf.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "output".as_ref()));
    name.push(".tmp");
    path.with_file_name(name)
}
