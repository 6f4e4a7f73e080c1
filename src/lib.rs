//! # pdfmill
//!
//! Merge, split, rotate, watermark and convert PDF files.
//!
//! Inputs can be PDFs or images (JPEG, PNG, GIF, BMP, TIFF, WebP); each
//! image becomes one page sized to its pixel dimensions at 72 dpi. Merges
//! preserve page content and inherited page attributes, and can add one
//! bookmark per source file.
//!
//! ## Library Usage
//!
//! ```no_run
//! use pdfmill::config::MergeConfig;
//! use pdfmill::io::PdfWriter;
//! use pdfmill::merge::Merger;
//! use std::path::PathBuf;
//!
//! # async fn example() -> pdfmill::Result<()> {
//! let config = MergeConfig::new(
//!     vec![PathBuf::from("cover.jpg"), PathBuf::from("letter.pdf")],
//!     PathBuf::from("merged.pdf"),
//! );
//!
//! let result = Merger::new().merge(&config).await?;
//! PdfWriter::new()
//!     .save(&result.document, &config.output)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`collect`]: Turning arguments, directories and custom orders into input lists
//! - [`config`]: Page spans, rotations and per-command configuration
//! - [`convert`]: Image to single-page PDF conversion
//! - [`error`]: Error types
//! - [`io`]: Loading and saving documents
//! - [`merge`]: Merging, bookmarks and metadata
//! - [`output`]: User-facing messages and progress
//! - [`pages`]: Page extraction and rotation
//! - [`rotate`]: The rotate operation
//! - [`split`]: The split operation
//! - [`validation`]: Input inspection and output checks
//! - [`watermark`]: Text watermarks

#![warn(missing_docs)]

pub mod collect;
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pages;
pub mod rotate;
pub mod split;
pub mod utils;
pub mod validation;
pub mod watermark;

#[cfg(test)]
mod test_support;

pub use error::{PdfMillError, Result};

/// Version of pdfmill.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the package.
pub const NAME: &str = env!("CARGO_PKG_NAME");
