//! Error types for pdfmill.
//!
//! Every failure the library can report is a [`PdfMillError`] variant that
//! names the offending path (when there is one) and the reason. The binary
//! maps each variant to a process exit code with [`PdfMillError::exit_code`].
//!
//! # Error Categories
//!
//! - **Input errors**: missing files, directories where files were expected,
//!   unsupported file types, unreadable order lists
//! - **Document errors**: invalid, corrupted or encrypted PDFs, undecodable images
//! - **Request errors**: invalid page spans, invalid configuration
//! - **Output errors**: existing output, failed creation or write

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmill operations.
pub type Result<T> = std::result::Result<T, PdfMillError>;

/// Main error type for pdfmill operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMillError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A directory was given where a file was expected.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input is neither a PDF nor a supported image.
    #[error(
        "Unsupported input file: {}\n  Hint: only PDF files and images (jpg, png, gif, bmp, tiff, webp) can be used",
        path.display()
    )]
    UnsupportedInput {
        /// Path to the unsupported file.
        path: PathBuf,
    },

    /// Failed to load PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is corrupted or has invalid structure.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Image could not be decoded or turned into a PDF page.
    #[error("Failed to convert image: {}\n  Reason: {reason}", path.display())]
    FailedToConvertImage {
        /// Path to the image.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// No files were provided (or found) for merging.
    #[error("No input files found for merging")]
    NoFilesToMerge,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read a custom order list file.
    #[error("Failed to read order file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Order list file contains an invalid entry.
    #[error(
        "Invalid entry in order file: {} at line {line_number}\n  Details: {details}",
        path.display()
    )]
    InvalidInputList {
        /// Path to the list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Page span does not fit the document.
    #[error(
        "Invalid page range '{range}' for PDF: {}\n  PDF has {total_pages} page(s). Page numbers must be between 1 and {total_pages}",
        path.display()
    )]
    InvalidPageRange {
        /// Path to the PDF file.
        path: PathBuf,
        /// Requested page range.
        range: String,
        /// Total pages in the PDF.
        total_pages: usize,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Page extraction or rotation failed.
    #[error("Page operation failed: {reason}")]
    PageOperationFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Bookmark operation failed.
    #[error("Failed to add bookmarks: {reason}")]
    BookmarkFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Metadata operation failed.
    #[error("Failed to set metadata: {reason}")]
    MetadataFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfMillError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfMillError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl PdfMillError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an UnsupportedInput error.
    pub fn unsupported_input(path: PathBuf) -> Self {
        Self::UnsupportedInput { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a FailedToConvertImage error.
    pub fn failed_to_convert_image(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToConvertImage {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidPageRange error.
    pub fn invalid_page_range(path: PathBuf, range: impl Into<String>, total_pages: usize) -> Self {
        Self::InvalidPageRange {
            path,
            range: range.into(),
            total_pages,
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a PageOperationFailed error.
    pub fn page_operation_failed(reason: impl Into<String>) -> Self {
        Self::PageOperationFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (operation can continue).
    ///
    /// Returns true for per-file errors that `--continue-on-error` may skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::FailedToConvertImage { .. }
                | Self::UnsupportedInput { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToMerge
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::UnsupportedInput { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::FailedToConvertImage { .. } => 3,
            Self::NoFilesToMerge => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidPageRange { .. } => 1,
            Self::MergeFailed { .. } => 6,
            Self::PageOperationFailed { .. } => 6,
            Self::BookmarkFailed { .. } => 6,
            Self::MetadataFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
