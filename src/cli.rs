//! CLI argument parsing for pdfmill.
//!
//! Each subcommand's arguments convert into the matching validated config
//! from [`pdfmill::config`]; nothing below this layer sees raw arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfmill::collect::{CollectOptions, collect_inputs, parse_order_list, read_order_file};
use pdfmill::config::{
    CompressionLevel, ConvertConfig, HexColor, MergeConfig, Metadata, OutputSettings,
    OverwriteMode, PageSpan, RotateConfig, RotateDefinition, SortOrder, SplitConfig,
    SplitDefinition, StandardFont, WatermarkConfig, WatermarkPosition,
};
use pdfmill::error::{PdfMillError, Result};

/// Merge, split, rotate, watermark and convert PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdfmill")]
#[command(version)]
#[command(about = "Merge, split, rotate, watermark and convert PDF files", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output - show details about each file and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed. Useful for scripts.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge PDFs and images into one PDF
    ///
    /// Examples:
    ///   pdfmill merge scans/ -o merged.pdf
    ///   pdfmill merge scans/ --order cover.jpg,letter.pdf -o merged.pdf
    ///   pdfmill merge chapter*.pdf appendix.png -o book.pdf
    Merge(MergeArgs),

    /// Copy page ranges of a PDF into new files
    ///
    /// Examples:
    ///   pdfmill split book.pdf -r 41-44 -o chapter3.pdf
    ///   pdfmill split book.pdf -r 1-2:intro -r 3-10 --out-dir parts/
    Split(SplitArgs),

    /// Rotate page ranges of a PDF
    ///
    /// Example:
    ///   pdfmill rotate scan.pdf -r 1-3:90 -r 7:180 -o fixed.pdf
    Rotate(RotateArgs),

    /// Stamp a text watermark onto a PDF
    ///
    /// Examples:
    ///   pdfmill watermark report.pdf -t DRAFT -o draft.pdf
    ///   pdfmill watermark scan.pdf -t CONFIDENTIAL --rotation 45 --pages 1,3-5 -o marked.pdf
    Watermark(WatermarkArgs),

    /// Convert images to single-page PDFs
    Convert(ConvertArgs),

    /// Show information about PDFs and images
    Info(InfoArgs),
}

/// Options shared by every command that writes files.
#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    /// Dry run - validate inputs and show what would be written
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Overwrite existing output files without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output files
    ///
    /// If an output file already exists, exit with an error instead of
    /// prompting.
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDFs
    ///
    /// - none: write streams as they are
    /// - standard: compress uncompressed streams (default)
    /// - maximum: also drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,
}

impl WriteArgs {
    /// Build output settings, folding in the global verbosity flags.
    pub fn settings(&self, verbose: bool, quiet: bool) -> Result<OutputSettings> {
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        Ok(OutputSettings {
            dry_run: self.dry_run,
            verbose,
            quiet,
            overwrite_mode,
            compression: CompressionLevel::from_str(&self.compression)?,
        })
    }
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input files, directories or glob patterns (in order)
    ///
    /// Directories are listed and sorted with --sort. Image files are
    /// converted to one page each. With --order or --order-file, pass a
    /// single directory (or nothing, for the current directory).
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Custom order: comma-separated file names replacing the directory listing
    #[arg(long, value_name = "NAMES")]
    pub order: Option<String>,

    /// Read the custom order from a file (one name per line, # comments)
    #[arg(long, value_name = "FILE", conflicts_with = "order")]
    pub order_file: Option<PathBuf>,

    /// Include files from subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Order of directory listings and glob matches
    #[arg(long, value_name = "ORDER", default_value = "natural")]
    #[arg(value_parser = ["natural", "name", "modified"])]
    pub sort: String,

    /// Leave out directory entries matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Add a bookmark at the first page of each merged file
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Set title metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for the output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Skip files that fail to load instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of files loaded in parallel (default: number of CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl MergeArgs {
    /// Resolve the inputs and build a validated merge config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order file cannot be read
    /// - An input or a custom order entry does not exist
    /// - Nothing mergeable is found
    /// - The resulting configuration is invalid
    pub async fn to_config(&self, verbose: bool, quiet: bool) -> Result<MergeConfig> {
        let order = match (&self.order, &self.order_file) {
            (Some(list), _) => Some(parse_order_list(list)),
            (None, Some(file)) => Some(read_order_file(file).await?),
            (None, None) => None,
        };

        let options = CollectOptions {
            sort: SortOrder::from_str(&self.sort)?,
            recursive: self.recursive,
            order,
            exclude: self.exclude.clone(),
        };
        let inputs = collect_inputs(&self.inputs, &options)?;

        let config = MergeConfig {
            inputs,
            output: self.output.clone(),
            bookmarks: self.bookmarks,
            metadata: Metadata::new(
                self.title.clone(),
                self.author.clone(),
                self.subject.clone(),
                self.keywords.clone(),
            ),
            continue_on_error: self.continue_on_error,
            jobs: self.jobs,
            settings: self.write.settings(verbose, quiet)?,
        };
        config.validate()?;

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Page range to copy, as START-END[:NAME] (repeatable)
    ///
    /// Pages are 1-based and inclusive. Unnamed ranges are written as
    /// <input>_<start>-<end>.pdf.
    #[arg(short, long = "range", value_name = "RANGE", required = true)]
    pub ranges: Vec<String>,

    /// Output file (only with a single range)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory (default: next to the input)
    #[arg(long, value_name = "DIR", conflicts_with = "output")]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl SplitArgs {
    /// Build a validated split config.
    pub fn to_config(&self, verbose: bool, quiet: bool) -> Result<SplitConfig> {
        let definitions = self
            .ranges
            .iter()
            .map(|r| SplitDefinition::from_str(r))
            .collect::<Result<Vec<_>>>()?;

        let config = SplitConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            output_dir: self.out_dir.clone(),
            definitions,
            settings: self.write.settings(verbose, quiet)?,
        };
        config.validate()?;

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Rotation as START-END:ANGLE, ANGLE one of 90, -90, 180, 270 (repeatable)
    #[arg(short, long = "rotate", value_name = "ROTATION", required = true)]
    pub rotations: Vec<String>,

    /// Output PDF file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl RotateArgs {
    /// Build a validated rotate config.
    pub fn to_config(&self, verbose: bool, quiet: bool) -> Result<RotateConfig> {
        let definitions = self
            .rotations
            .iter()
            .map(|r| RotateDefinition::from_str(r))
            .collect::<Result<Vec<_>>>()?;

        let config = RotateConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            definitions,
            settings: self.write.settings(verbose, quiet)?,
        };
        config.validate()?;

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct WatermarkArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Watermark text
    ///
    /// Drawn with a standard PDF font; characters outside Latin-1 print as '?'.
    #[arg(short, long, value_name = "TEXT")]
    pub text: String,

    /// Output PDF file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Pages to stamp, as comma-separated pages or START-END ranges (default: all)
    #[arg(short, long, value_name = "PAGES", value_delimiter = ',')]
    pub pages: Vec<String>,

    /// Where the watermark sits on the page
    #[arg(long, value_name = "POSITION", default_value = "center")]
    #[arg(value_parser = [
        "center", "top-left", "top-center", "top-right", "middle-left",
        "middle-right", "bottom-left", "bottom-center", "bottom-right",
    ])]
    pub position: String,

    /// Font for the text
    #[arg(long, value_name = "FONT", default_value = "helvetica")]
    #[arg(value_parser = [
        "helvetica", "helvetica-bold", "helvetica-oblique", "times-roman",
        "courier", "courier-bold", "courier-oblique",
    ])]
    pub font: String,

    /// Font size in points
    #[arg(long, value_name = "POINTS", default_value_t = 24.0)]
    pub font_size: f32,

    /// Text color as #RRGGBB
    #[arg(long, value_name = "COLOR", default_value = "#808080")]
    pub color: String,

    /// Opacity from 0.0 (invisible) to 1.0 (opaque)
    #[arg(long, value_name = "OPACITY", default_value_t = 0.5)]
    pub opacity: f32,

    /// Counter-clockwise rotation in degrees
    #[arg(long, value_name = "DEGREES", default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotation: f32,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl WatermarkArgs {
    /// Build a validated watermark config.
    pub fn to_config(&self, verbose: bool, quiet: bool) -> Result<WatermarkConfig> {
        let pages = self
            .pages
            .iter()
            .map(|p| PageSpan::from_str(p))
            .collect::<Result<Vec<_>>>()?;

        let config = WatermarkConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            text: self.text.clone(),
            font: StandardFont::from_str(&self.font)?,
            font_size: self.font_size,
            color: HexColor::from_str(&self.color)?,
            opacity: self.opacity,
            rotation: self.rotation,
            position: WatermarkPosition::from_str(&self.position)?,
            pages,
            settings: self.write.settings(verbose, quiet)?,
        };
        config.validate()?;

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image files to convert
    #[arg(required = true, value_name = "IMAGE")]
    pub inputs: Vec<PathBuf>,

    /// Output directory (default: next to each image)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl ConvertArgs {
    /// Build a validated convert config.
    pub fn to_config(&self, verbose: bool, quiet: bool) -> Result<ConvertConfig> {
        let config = ConvertConfig {
            inputs: self.inputs.clone(),
            output_dir: self.out_dir.clone(),
            settings: self.write.settings(verbose, quiet)?,
        };
        config.validate()?;

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Files to inspect
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Print the information as JSON
    #[arg(long)]
    pub json: bool,

    /// Report files that fail to load instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,
}

impl InfoArgs {
    /// Reject flags that make no sense together.
    pub fn validate(&self, verbose: bool) -> Result<()> {
        if self.json && verbose {
            return Err(PdfMillError::invalid_config(
                "--json cannot be combined with --verbose",
            ));
        }
        Ok(())
    }
}
