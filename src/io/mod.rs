//! File I/O for pdfmill.
//!
//! This module handles reading sources and writing results:
//! - Loading PDF documents, or converting images, from disk
//! - Bounded-parallel loading that keeps input order
//! - Atomic writes with compression and overwrite checks
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let doc = reader.load(&PathBuf::from("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&doc.document, &PathBuf::from("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteStatistics};
