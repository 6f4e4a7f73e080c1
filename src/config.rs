//! Configuration module for pdfmill.
//!
//! The CLI layer turns its arguments into one of the validated configuration
//! structs below ([`MergeConfig`], [`SplitConfig`], [`RotateConfig`],
//! [`WatermarkConfig`], [`ConvertConfig`]). The library never looks at raw
//! arguments. This module also owns the small value types those configs are
//! built from: page spans, split and rotate definitions, watermark styling,
//! compression and overwrite modes.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::error::{PdfMillError, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact stream encoding.
    None,
    /// Flate-compress uncompressed streams.
    #[default]
    Standard,
    /// Compress and prune unreachable objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfMillError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Order in which directory listings and glob matches are merged.
///
/// Directory listings come back in an OS-dependent order, so they are always
/// sorted with one of these before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Compare digit runs numerically: `2.pdf` before `10.pdf`.
    #[default]
    Natural,
    /// Plain byte-wise file name order.
    Name,
    /// Oldest modification time first.
    Modified,
}

impl FromStr for SortOrder {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "natural" => Ok(Self::Natural),
            "name" => Ok(Self::Name),
            "modified" | "mtime" => Ok(Self::Modified),
            _ => Err(PdfMillError::invalid_config(format!(
                "Invalid sort order: {s}. Must be one of: natural, name, modified"
            ))),
        }
    }
}

/// Page rotation in degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise (90 counter-clockwise).
    Clockwise270,
}

impl Rotation {
    /// Parse rotation from degrees. `-90` is accepted as `270`.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees {
            90 => Ok(Self::Clockwise90),
            180 | -180 => Ok(Self::Rotate180),
            270 | -90 => Ok(Self::Clockwise270),
            _ => Err(PdfMillError::invalid_config(format!(
                "Invalid rotation: {degrees}. Must be 90, -90, 180 or 270"
            ))),
        }
    }

    /// Get rotation as clockwise degrees.
    pub fn as_degrees(&self) -> i64 {
        match self {
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }
}

/// An inclusive, 1-based page range.
///
/// `"41-44"` selects pages 41, 42, 43 and 44; `"7"` selects page 7 alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSpan {
    start: u32,
    end: u32,
}

impl PageSpan {
    /// Create a span, rejecting zero pages and reversed bounds.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 || end == 0 {
            return Err(PdfMillError::invalid_config(
                "Page numbers must be positive (1-indexed)",
            ));
        }
        if start > end {
            return Err(PdfMillError::invalid_config(format!(
                "Invalid range {start}-{end}: start page must be less than or equal to end page"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a span string.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmill::config::PageSpan;
    ///
    /// let span = PageSpan::parse("41-44").unwrap();
    /// assert_eq!(span.start(), 41);
    /// assert_eq!(span.end(), 44);
    /// assert_eq!(span.len(), 4);
    /// ```
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Page range cannot be empty");
        }

        let (start, end) = match s.split_once('-') {
            Some((start, end)) => {
                if end.contains('-') {
                    bail!("Invalid page range format: {s}. Expected format like '1-5'");
                }
                let start: u32 = start
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {start}"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {end}"))?;
                (start, end)
            }
            None => {
                let page: u32 = s
                    .parse()
                    .with_context(|| format!("Invalid page number: {s}"))?;
                (page, page)
            }
        };

        Ok(Self::new(start, end)?)
    }

    /// First page of the span (1-based).
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last page of the span (1-based, inclusive).
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the span.
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// A span always holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if a page number is inside the span.
    pub fn contains(&self, page: u32) -> bool {
        page >= self.start && page <= self.end
    }

    /// Iterate over the page numbers of the span in order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// Check that the span fits a document with `total_pages` pages.
    pub fn validate(&self, total_pages: usize, path: &Path) -> Result<()> {
        if self.end as usize > total_pages {
            return Err(PdfMillError::invalid_page_range(
                path.to_path_buf(),
                self.to_string(),
                total_pages,
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for PageSpan {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).map_err(|e| PdfMillError::invalid_config(format!("{e:#}")))
    }
}

/// One output of a split: a page span and an optional output file name.
///
/// Text form is `START-END[:NAME]`, e.g. `"1-3:intro"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDefinition {
    /// Pages to copy.
    pub span: PageSpan,
    /// Output file name, with or without the `.pdf` extension.
    pub filename: Option<String>,
}

impl SplitDefinition {
    /// Create a definition.
    pub fn new(span: PageSpan, filename: Option<String>) -> Self {
        let filename = filename
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Self { span, filename }
    }

    /// File name this split is written to, given the input's file stem.
    ///
    /// Unnamed definitions become `<stem>_<start>-<end>.pdf`.
    pub fn output_file_name(&self, stem: &str) -> String {
        match &self.filename {
            Some(name) if has_pdf_extension(name) => name.clone(),
            Some(name) => format!("{name}.pdf"),
            None => format!("{stem}_{}-{}.pdf", self.span.start(), self.span.end()),
        }
    }
}

impl FromStr for SplitDefinition {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        let (span, name) = match s.split_once(':') {
            Some((span, name)) => (span, Some(name.to_string())),
            None => (s, None),
        };
        Ok(Self::new(span.parse()?, name))
    }
}

/// Rotation applied to a page span. Text form is `START-END:ANGLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateDefinition {
    /// Pages to rotate.
    pub span: PageSpan,
    /// Clockwise rotation to add.
    pub rotation: Rotation,
}

impl FromStr for RotateDefinition {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        let (span, angle) = s.rsplit_once(':').ok_or_else(|| {
            PdfMillError::invalid_config(format!(
                "Invalid rotation '{s}'. Expected format like '1-5:90'"
            ))
        })?;
        let degrees: i32 = angle.trim().parse().map_err(|_| {
            PdfMillError::invalid_config(format!("Invalid rotation angle: {angle}"))
        })?;

        Ok(Self {
            span: span.parse()?,
            rotation: Rotation::from_degrees(degrees)?,
        })
    }
}

/// Where a watermark sits on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPosition {
    /// Centered on the page.
    #[default]
    Center,
    /// Top left corner.
    TopLeft,
    /// Top edge, centered horizontally.
    TopCenter,
    /// Top right corner.
    TopRight,
    /// Left edge, centered vertically.
    MiddleLeft,
    /// Right edge, centered vertically.
    MiddleRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom edge, centered horizontally.
    BottomCenter,
    /// Bottom right corner.
    BottomRight,
}

impl FromStr for WatermarkPosition {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "center" | "c" => Ok(Self::Center),
            "top-left" | "tl" => Ok(Self::TopLeft),
            "top-center" | "tc" => Ok(Self::TopCenter),
            "top-right" | "tr" => Ok(Self::TopRight),
            "middle-left" | "l" => Ok(Self::MiddleLeft),
            "middle-right" | "r" => Ok(Self::MiddleRight),
            "bottom-left" | "bl" => Ok(Self::BottomLeft),
            "bottom-center" | "bc" => Ok(Self::BottomCenter),
            "bottom-right" | "br" => Ok(Self::BottomRight),
            _ => Err(PdfMillError::invalid_config(format!(
                "Invalid watermark position: {s}. Must be one of: center, top-left, \
                 top-center, top-right, middle-left, middle-right, bottom-left, \
                 bottom-center, bottom-right"
            ))),
        }
    }
}

/// Standard Type 1 fonts every PDF viewer provides without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    /// Helvetica.
    #[default]
    Helvetica,
    /// Helvetica Bold.
    HelveticaBold,
    /// Helvetica Oblique.
    HelveticaOblique,
    /// Times Roman.
    TimesRoman,
    /// Courier.
    Courier,
    /// Courier Bold.
    CourierBold,
    /// Courier Oblique.
    CourierOblique,
}

impl StandardFont {
    /// PostScript name used as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::TimesRoman => "Times-Roman",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
        }
    }
}

impl FromStr for StandardFont {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "helvetica" => Ok(Self::Helvetica),
            "helvetica-bold" => Ok(Self::HelveticaBold),
            "helvetica-oblique" => Ok(Self::HelveticaOblique),
            "times-roman" | "times" => Ok(Self::TimesRoman),
            "courier" => Ok(Self::Courier),
            "courier-bold" => Ok(Self::CourierBold),
            "courier-oblique" => Ok(Self::CourierOblique),
            _ => Err(PdfMillError::invalid_config(format!(
                "Invalid font: {s}. Must be one of: helvetica, helvetica-bold, \
                 helvetica-oblique, times-roman, courier, courier-bold, courier-oblique"
            ))),
        }
    }
}

/// An RGB color written as `#RRGGBB` or `RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl HexColor {
    /// Channels scaled to `0.0..=1.0`, as the `rg` operator expects.
    pub fn components(&self) -> [f32; 3] {
        [self.red, self.green, self.blue].map(|c| f32::from(c) / 255.0)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self {
            red: 0x80,
            green: 0x80,
            blue: 0x80,
        }
    }
}

impl FromStr for HexColor {
    type Err = PdfMillError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || {
            PdfMillError::invalid_config(format!("Invalid color: {s}. Expected #RRGGBB"))
        };

        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        Ok(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        })
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Document subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let trimmed = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: trimmed(title),
            author: trimmed(author),
            subject: trimmed(subject),
            keywords: trimmed(keywords),
        }
    }
}

/// Settings shared by every command that writes files.
#[derive(Debug, Clone, Default)]
pub struct OutputSettings {
    /// Validate and report without writing anything.
    pub dry_run: bool,
    /// Verbose output mode.
    pub verbose: bool,
    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,
    /// Compression level for output.
    pub compression: CompressionLevel,
}

impl OutputSettings {
    /// Check if output should be displayed.
    ///
    /// Dry runs always print, since the report is their only result.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }

    fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(PdfMillError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }
        Ok(())
    }
}

/// Configuration for a merge.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Resolved input files (PDFs and images) in merge order.
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Add one bookmark per merged input.
    pub bookmarks: bool,

    /// Metadata to set on the output document.
    pub metadata: Metadata,

    /// Skip inputs that fail to load instead of stopping.
    pub continue_on_error: bool,

    /// Number of parallel loads (None = auto-detect).
    pub jobs: Option<usize>,

    /// Output settings.
    pub settings: OutputSettings,
}

impl MergeConfig {
    /// Create a merge config with default settings.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            bookmarks: false,
            metadata: Metadata::default(),
            continue_on_error: false,
            jobs: None,
            settings: OutputSettings::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfMillError::NoFilesToMerge);
        }

        self.settings.validate()?;

        if self.jobs == Some(0) {
            return Err(PdfMillError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        ensure_output_not_input(&self.output, &self.inputs)
    }

    /// Get the effective number of parallel loads.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Configuration for a split.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Input PDF.
    pub input: PathBuf,

    /// Output file, used when there is exactly one definition.
    pub output: Option<PathBuf>,

    /// Output directory for definitions without an explicit output file.
    pub output_dir: Option<PathBuf>,

    /// Page spans to copy, one output file each.
    pub definitions: Vec<SplitDefinition>,

    /// Output settings.
    pub settings: OutputSettings,
}

impl SplitConfig {
    /// Validate the configuration.
    ///
    /// Page spans are checked against the document later, once it is loaded.
    pub fn validate(&self) -> Result<()> {
        if self.definitions.is_empty() {
            return Err(PdfMillError::invalid_config(
                "At least one page range is required",
            ));
        }

        self.settings.validate()?;

        if self.output.is_some() && self.definitions.len() > 1 {
            return Err(PdfMillError::invalid_config(
                "--output can only be used with a single page range; use --out-dir for several",
            ));
        }

        let outputs = self.output_paths()?;
        ensure_output_not_input(&self.input, &outputs)
    }

    /// Resolve the output path of every definition, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if two definitions resolve to the same file name.
    pub fn output_paths(&self) -> Result<Vec<PathBuf>> {
        if let Some(output) = &self.output {
            return Ok(vec![output.clone()]);
        }

        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("split");
        let dir = self
            .output_dir
            .clone()
            .or_else(|| self.input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut paths = Vec::with_capacity(self.definitions.len());
        for definition in &self.definitions {
            let name = definition.output_file_name(stem);
            if !seen.insert(name.clone()) {
                return Err(PdfMillError::invalid_config(format!(
                    "Duplicate output file name: {name}"
                )));
            }
            paths.push(dir.join(name));
        }

        Ok(paths)
    }
}

/// Configuration for a rotation.
#[derive(Debug, Clone)]
pub struct RotateConfig {
    /// Input PDF.
    pub input: PathBuf,

    /// Output PDF.
    pub output: PathBuf,

    /// Rotations, applied in order.
    pub definitions: Vec<RotateDefinition>,

    /// Output settings.
    pub settings: OutputSettings,
}

impl RotateConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.definitions.is_empty() {
            return Err(PdfMillError::invalid_config(
                "At least one rotation is required",
            ));
        }

        self.settings.validate()?;
        ensure_output_not_input(&self.output, std::slice::from_ref(&self.input))
    }
}

/// Configuration for stamping a text watermark.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Input PDF.
    pub input: PathBuf,

    /// Output PDF.
    pub output: PathBuf,

    /// Watermark text. Characters outside Latin-1 are drawn as `?`.
    pub text: String,

    /// Font for the text.
    pub font: StandardFont,

    /// Font size in points.
    pub font_size: f32,

    /// Fill color.
    pub color: HexColor,

    /// Opacity from 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,

    /// Counter-clockwise rotation in degrees.
    pub rotation: f32,

    /// Placement on the page.
    pub position: WatermarkPosition,

    /// Pages to stamp; empty means every page.
    pub pages: Vec<PageSpan>,

    /// Output settings.
    pub settings: OutputSettings,
}

impl WatermarkConfig {
    /// A centered, half-transparent gray watermark on every page.
    pub fn new(input: PathBuf, output: PathBuf, text: impl Into<String>) -> Self {
        Self {
            input,
            output,
            text: text.into(),
            font: StandardFont::default(),
            font_size: 24.0,
            color: HexColor::default(),
            opacity: 0.5,
            rotation: 0.0,
            position: WatermarkPosition::default(),
            pages: Vec::new(),
            settings: OutputSettings::default(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(PdfMillError::invalid_config(
                "Watermark text cannot be empty",
            ));
        }
        if !(self.font_size >= 1.0 && self.font_size.is_finite()) {
            return Err(PdfMillError::invalid_config(format!(
                "Font size must be at least 1, got {}",
                self.font_size
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(PdfMillError::invalid_config(format!(
                "Opacity must be between 0.0 and 1.0, got {}",
                self.opacity
            )));
        }
        if !self.rotation.is_finite() {
            return Err(PdfMillError::invalid_config("Rotation must be a number"));
        }

        self.settings.validate()?;
        ensure_output_not_input(&self.output, std::slice::from_ref(&self.input))
    }
}

/// Configuration for converting images to single-page PDFs.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Images to convert.
    pub inputs: Vec<PathBuf>,

    /// Directory for the PDFs (default: next to each image).
    pub output_dir: Option<PathBuf>,

    /// Output settings.
    pub settings: OutputSettings,
}

impl ConvertConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfMillError::invalid_config("No images specified"));
        }
        self.settings.validate()?;
        self.output_paths().map(|_| ())
    }

    /// Resolve the output path of every image, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if two images resolve to the same PDF, such as
    /// `scan.jpg` and `scan.png`.
    pub fn output_paths(&self) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut paths = Vec::with_capacity(self.inputs.len());

        for input in &self.inputs {
            let output = self.output_path_for(input);
            if !seen.insert(resolve_path(&output)) {
                return Err(PdfMillError::invalid_config(format!(
                    "Duplicate output file name: {} (from {})",
                    output.display(),
                    input.display()
                )));
            }
            paths.push(output);
        }

        Ok(paths)
    }

    /// Path of the PDF written for `image`.
    pub fn output_path_for(&self, image: &Path) -> PathBuf {
        let file_name = image
            .file_stem()
            .map(|stem| {
                let mut name = stem.to_os_string();
                name.push(".pdf");
                name
            })
            .unwrap_or_else(|| "image.pdf".into());

        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => image.with_file_name(file_name),
        }
    }
}

/// Absolute form of `path` with `.`, `..` and symlinks resolved.
///
/// A file that does not exist yet is resolved through its parent directory.
pub(crate) fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn ensure_output_not_input(output: &Path, inputs: &[PathBuf]) -> Result<()> {
    let output = resolve_path(output);
    if inputs.iter().any(|input| resolve_path(input) == output) {
        return Err(PdfMillError::invalid_config(format!(
            "Output file cannot be the same as an input file: {}",
            output.display()
        )));
    }
    Ok(())
}

fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
