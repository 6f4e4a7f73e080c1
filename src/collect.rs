//! Input collection.
//!
//! Turns the inputs given on the command line (files, directories and glob
//! patterns) into the ordered list of files to merge. Directory listings and
//! glob matches come back in whatever order the OS produces, so they are
//! always sorted with the configured [`SortOrder`]. A custom order list
//! replaces the listing of the input directory entirely.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::collect::{CollectOptions, collect_inputs};
//! use std::path::PathBuf;
//!
//! # fn example() -> pdfmill::Result<()> {
//! let files = collect_inputs(&[PathBuf::from("scans/")], &CollectOptions::default())?;
//! for file in files {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::SortOrder;
use crate::error::{PdfMillError, Result};

/// File extensions treated as PDF documents.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// File extensions treated as images and converted before merging.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// What a collected file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A PDF document.
    Pdf,
    /// A raster image, converted to a one-page PDF.
    Image,
    /// Anything else.
    Other,
}

impl InputKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Other;
        };

        if PDF_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            Self::Pdf
        } else if IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            Self::Image
        } else {
            Self::Other
        }
    }

    /// Whether files of this kind can be merged.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Classify a path by its extension.
pub fn classify(path: &Path) -> InputKind {
    InputKind::from_path(path)
}

/// Options controlling how inputs are expanded and ordered.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Order applied to directory listings and glob matches.
    pub sort: SortOrder,

    /// Descend into subdirectories when listing a directory.
    pub recursive: bool,

    /// Custom order: file names that replace the directory listing.
    pub order: Option<Vec<String>>,

    /// Glob patterns of file names to leave out of directory listings.
    pub exclude: Vec<String>,
}

/// Expands input arguments into an ordered list of mergeable files.
#[derive(Debug)]
pub struct InputCollector {
    options: CollectOptions,
    supported: GlobSet,
    excluded: GlobSet,
}

impl InputCollector {
    /// Create a collector, compiling the extension and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(options: CollectOptions) -> Result<Self> {
        let mut supported = GlobSetBuilder::new();
        for ext in PDF_EXTENSIONS.iter().chain(IMAGE_EXTENSIONS) {
            let glob = GlobBuilder::new(&format!("*.{ext}"))
                .case_insensitive(true)
                .build()
                .map_err(|e| PdfMillError::invalid_config(e.to_string()))?;
            supported.add(glob);
        }

        let mut excluded = GlobSetBuilder::new();
        for pattern in &options.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                PdfMillError::invalid_config(format!("Invalid exclude pattern '{pattern}': {e}"))
            })?;
            excluded.add(glob);
        }

        let build = |builder: GlobSetBuilder| {
            builder
                .build()
                .map_err(|e| PdfMillError::invalid_config(e.to_string()))
        };

        Ok(Self {
            supported: build(supported)?,
            excluded: build(excluded)?,
            options,
        })
    }

    /// Expand `inputs` in order.
    ///
    /// Each input is handled by what it is on disk: a directory is listed and
    /// sorted, a file is taken as is, and anything else is expanded as a glob
    /// pattern. With a custom order set, the single input directory (or the
    /// current directory when no input is given) supplies the base for the
    /// listed names instead.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input does not exist and is not a pattern
    /// - A file named explicitly has an unsupported extension
    /// - Nothing mergeable is found
    pub fn collect(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if let Some(order) = &self.options.order {
            let base = match inputs {
                [] => PathBuf::from("."),
                [dir] if dir.is_dir() => dir.clone(),
                _ => {
                    return Err(PdfMillError::invalid_config(
                        "A custom order is resolved against one input directory; \
                         pass exactly one directory (or none for the current directory)",
                    ));
                }
            };
            return self.collect_ordered(&base, order);
        }

        let mut collected = Vec::new();
        for input in inputs {
            if input.is_dir() {
                collected.extend(self.list_directory(input)?);
            } else if input.is_file() {
                if !classify(input).is_supported() {
                    return Err(PdfMillError::unsupported_input(input.clone()));
                }
                collected.push(input.clone());
            } else if is_glob_pattern(input) {
                collected.extend(self.expand_pattern(&input.to_string_lossy())?);
            } else {
                return Err(PdfMillError::file_not_found(input.clone()));
            }
        }

        if collected.is_empty() {
            return Err(PdfMillError::NoFilesToMerge);
        }

        debug!(count = collected.len(), "collected input files");
        Ok(collected)
    }

    fn collect_ordered(&self, base: &Path, order: &[String]) -> Result<Vec<PathBuf>> {
        let paths = apply_custom_order(base, order)?;

        if let Some(path) = paths.iter().find(|p| !classify(p).is_supported()) {
            return Err(PdfMillError::unsupported_input(path.clone()));
        }
        if paths.is_empty() {
            return Err(PdfMillError::NoFilesToMerge);
        }

        debug!(count = paths.len(), base = %base.display(), "using custom order");
        Ok(paths)
    }

    /// List the mergeable files of a directory, sorted.
    ///
    /// Hidden files, excluded names and unsupported extensions are skipped.
    pub fn list_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                PdfMillError::FileNotAccessible {
                    path,
                    source: e.into(),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') || self.excluded.is_match(name) {
                debug!(path = %entry.path().display(), "excluded");
                continue;
            }
            if !self.supported.is_match(name) {
                warn!(path = %entry.path().display(), "skipping unsupported file");
                continue;
            }

            files.push(entry.into_path());
        }

        sort_paths(&mut files, self.options.sort);
        Ok(files)
    }

    fn expand_pattern(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let entries = glob::glob(pattern).map_err(|e| {
            PdfMillError::invalid_config(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PdfMillError::FileNotAccessible {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;

            if !path.is_file() {
                continue;
            }
            if !classify(&path).is_supported() {
                warn!(path = %path.display(), "skipping unsupported file");
                continue;
            }
            files.push(path);
        }

        if files.is_empty() {
            warn!(pattern, "pattern matched no mergeable files");
        }

        sort_paths(&mut files, self.options.sort);
        Ok(files)
    }
}

/// Expand `inputs` with a fresh [`InputCollector`].
pub fn collect_inputs(inputs: &[PathBuf], options: &CollectOptions) -> Result<Vec<PathBuf>> {
    InputCollector::new(options.clone())?.collect(inputs)
}

/// Resolve a custom order list against `dir`.
///
/// Relative names are joined onto `dir`; absolute paths are kept. Every entry
/// must exist.
pub fn apply_custom_order(dir: &Path, names: &[String]) -> Result<Vec<PathBuf>> {
    names
        .iter()
        .map(|name| {
            let path = Path::new(name);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                dir.join(path)
            };

            if path.is_file() {
                Ok(path)
            } else {
                Err(PdfMillError::file_not_found(path))
            }
        })
        .collect()
}

/// Split an inline custom order (`a.pdf,b.pdf`) into names.
pub fn parse_order_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Read a custom order list file.
///
/// One file name per line. Blank lines and lines starting with `#` are
/// ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or an entry names a directory.
pub async fn read_order_file(path: &Path) -> Result<Vec<String>> {
    use tokio::fs::File;
    use tokio::io::{AsyncBufReadExt, BufReader};

    let read_error = |e| PdfMillError::FailedToReadInputList {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::open(path).await.map_err(read_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut names = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await.map_err(read_error)? {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.ends_with('/') || line.ends_with('\\') {
            return Err(PdfMillError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: format!("'{line}' names a directory, not a file"),
            });
        }

        names.push(line.to_string());
    }

    Ok(names)
}

/// Sort paths in place.
pub fn sort_paths(paths: &mut [PathBuf], order: SortOrder) {
    match order {
        SortOrder::Natural => paths.sort_by(|a, b| compare_natural(a, b)),
        SortOrder::Name => paths.sort(),
        SortOrder::Modified => {
            paths.sort_by_cached_key(|p| {
                std::fs::metadata(p)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH)
            });
        }
    }
}

/// Natural order, ignoring case; the case-sensitive order breaks ties.
fn compare_natural(a: &Path, b: &Path) -> Ordering {
    let (a, b) = (a.to_string_lossy(), b.to_string_lossy());
    natord::compare_ignore_case(&a, &b).then_with(|| natord::compare(&a, &b))
}

fn is_glob_pattern(path: &Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}
