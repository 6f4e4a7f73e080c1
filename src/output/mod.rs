//! Output formatting and display.
//!
//! Everything the binary tells the user (status lines, progress, reports)
//! goes through this module. Diagnostics for developers go through
//! `tracing` instead.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::output::OutputFormatter;
//! use pdfmill::config::OutputSettings;
//!
//! let formatter = OutputFormatter::from_settings(&OutputSettings::default());
//! formatter.info("Starting merge operation");
//! formatter.success("Merge completed successfully");
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::io::WriteStatistics;
use crate::merge::MergeStatistics;
use crate::validation::{PdfInfo, ValidationSummary};

/// Display a validation summary (used for merge dry runs).
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    for (idx, info) in summary.results.iter().enumerate() {
        formatter.list_item(
            idx + 1,
            &format!(
                "{} ({} pages, {})",
                info.path.display(),
                info.page_count,
                info.format_file_size()
            ),
        );
    }

    for (path, reason) in &summary.failures {
        formatter.warning(&format!("Skipping {}: {reason}", path.display()));
    }

    formatter.info(&format!(
        "\nTotal: {} file(s), {} pages, {}",
        summary.files_validated,
        summary.total_pages,
        summary.format_total_size()
    ));
}

/// Display the statistics of a finished merge.
pub fn display_merge_statistics(
    formatter: &OutputFormatter,
    stats: &MergeStatistics,
    written: &WriteStatistics,
) {
    formatter.success(&format!(
        "Merged {} file(s) into {} ({} pages, {})",
        stats.files_merged,
        written.output_path.display(),
        stats.total_pages,
        written.format_file_size()
    ));

    if stats.files_skipped > 0 {
        formatter.warning(&format!("{} file(s) skipped", stats.files_skipped));
    }
    if stats.images_converted > 0 {
        formatter.detail("Images converted", &stats.images_converted.to_string());
    }
    if stats.bookmarks_added > 0 {
        formatter.detail("Bookmarks", &stats.bookmarks_added.to_string());
    }
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail(
        "Load time",
        &format!("{:.2}s", stats.load_time.as_secs_f64()),
    );
    formatter.detail(
        "Total time",
        &format!(
            "{:.2}s",
            (stats.merge_time + written.write_time).as_secs_f64()
        ),
    );
}

/// Display the information of one file in text form.
pub fn display_pdf_info(formatter: &OutputFormatter, info: &PdfInfo) {
    formatter.section(&info.path.display().to_string());

    let mut lines = vec![
        ("Name", info.name.clone()),
        ("Size", info.format_file_size()),
        ("Pages", info.page_count.to_string()),
        ("Version", info.version.clone()),
        ("Objects", info.object_count.to_string()),
    ];
    if let Some(modified) = &info.modified {
        lines.push(("Modified", modified.clone()));
    }
    if let Some(dims) = info.page_dimensions {
        lines.push((
            "Page size",
            format!("{:.1} x {:.1} pts", dims.width, dims.height),
        ));
    }

    let metadata = [
        ("Title", &info.metadata.title),
        ("Author", &info.metadata.author),
        ("Subject", &info.metadata.subject),
        ("Keywords", &info.metadata.keywords),
    ];
    for (label, value) in metadata {
        if let Some(value) = value {
            lines.push((label, value.clone()));
        }
    }

    for (label, value) in lines {
        formatter.info(&format!("  {label}: {value}"));
    }
}
