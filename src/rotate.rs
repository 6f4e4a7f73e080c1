//! Rotating page spans of a PDF.

use std::path::PathBuf;
use tracing::info;

use crate::config::RotateConfig;
use crate::error::{PdfMillError, Result};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::pages::PageExtractor;

/// Result of a rotation.
#[derive(Debug, Clone)]
pub struct RotateOutcome {
    /// Output file.
    pub output: PathBuf,

    /// Page rotations applied, counted once per definition.
    pub pages_rotated: usize,

    /// Write statistics; `None` for dry runs.
    pub statistics: Option<WriteStatistics>,
}

/// Load the input of `config`, apply every rotation in order and write the
/// result.
///
/// Rotations on overlapping spans add up. Every span is checked against the
/// page count before anything is changed.
pub async fn rotate_pdf(config: &RotateConfig) -> Result<RotateOutcome> {
    config.validate()?;

    let writer = PdfWriter::new().with_compression(config.settings.compression);
    writer
        .check_overwrite(&config.output, config.settings.overwrite_mode)
        .await?;

    let loaded = PdfReader::new().load(&config.input).await?;
    for definition in &config.definitions {
        definition.span.validate(loaded.page_count, &config.input)?;
    }

    let pages_rotated = config.definitions.iter().map(|d| d.span.len()).sum();
    if config.settings.dry_run {
        return Ok(RotateOutcome {
            output: config.output.clone(),
            pages_rotated,
            statistics: None,
        });
    }

    let definitions = config.definitions.clone();
    let mut doc = loaded.document;
    let doc = tokio::task::spawn_blocking(move || {
        let extractor = PageExtractor::new();
        for definition in &definitions {
            extractor.rotate_span(&mut doc, definition.span, definition.rotation)?;
        }
        Ok::<_, PdfMillError>(doc)
    })
    .await
    .map_err(|e| PdfMillError::page_operation_failed(format!("Rotate task failed: {e}")))??;

    let statistics = writer.save_with_stats(&doc, &config.output).await?;
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        pages = pages_rotated,
        "rotated pages"
    );

    Ok(RotateOutcome {
        output: config.output.clone(),
        pages_rotated,
        statistics: Some(statistics),
    })
}
