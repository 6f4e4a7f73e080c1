//! Copying page spans of one PDF into new files.

use lopdf::Document;
use std::path::PathBuf;
use tracing::info;

use crate::config::{PageSpan, SplitConfig};
use crate::error::{PdfMillError, Result};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::pages::PageExtractor;

/// What happened to one split definition.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Pages copied.
    pub span: PageSpan,

    /// File the span was (or, in a dry run, would be) written to.
    pub output: PathBuf,

    /// Write statistics; `None` for dry runs.
    pub statistics: Option<WriteStatistics>,
}

/// Splits one PDF into several by page span.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    reader: PdfReader,
    extractor: PageExtractor,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every definition of `config` against its input.
    ///
    /// The input is loaded once. All spans are checked against its page
    /// count, and all outputs against the overwrite mode, before the first
    /// file is written.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMillError::InvalidPageRange`] for a span past the end of
    /// the document, plus any load, overwrite or write error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmill::split::Splitter;
    /// # use pdfmill::config::SplitConfig;
    /// # async fn example(config: SplitConfig) -> Result<(), Box<dyn std::error::Error>> {
    /// for outcome in Splitter::new().split(&config).await? {
    ///     println!("pages {} -> {}", outcome.span, outcome.output.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn split(&self, config: &SplitConfig) -> Result<Vec<SplitOutcome>> {
        config.validate()?;
        let outputs = config.output_paths()?;

        let loaded = self.reader.load(&config.input).await?;
        for definition in &config.definitions {
            definition.span.validate(loaded.page_count, &config.input)?;
        }

        let writer = PdfWriter::new().with_compression(config.settings.compression);
        for output in &outputs {
            writer
                .check_overwrite(output, config.settings.overwrite_mode)
                .await?;
        }

        let mut outcomes = Vec::with_capacity(outputs.len());
        for (definition, output) in config.definitions.iter().zip(outputs) {
            let statistics = if config.settings.dry_run {
                None
            } else {
                let part = self.extract(&loaded.document, definition.span).await?;
                let stats = writer.save_with_stats(&part, &output).await?;
                info!(span = %definition.span, output = %output.display(), "wrote split");
                Some(stats)
            };

            outcomes.push(SplitOutcome {
                span: definition.span,
                output,
                statistics,
            });
        }

        Ok(outcomes)
    }

    async fn extract(&self, doc: &Document, span: PageSpan) -> Result<Document> {
        let extractor = self.extractor;
        let doc = doc.clone();

        tokio::task::spawn_blocking(move || extractor.extract_span(&doc, span))
            .await
            .map_err(|e| PdfMillError::page_operation_failed(format!("Split task failed: {e}")))?
    }
}
