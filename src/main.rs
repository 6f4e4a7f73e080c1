//! pdfmill - Merge, split, rotate, watermark and convert PDF files.
//!
//! User-facing output goes to stdout through the [`OutputFormatter`];
//! diagnostics go to stderr through `tracing` (`-v` for debug, or `RUST_LOG`).

mod cli;

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Cli, Command, ConvertArgs, InfoArgs, MergeArgs, RotateArgs, SplitArgs, WatermarkArgs,
};
use pdfmill::config::{OutputSettings, OverwriteMode};
use pdfmill::convert::convert_images;
use pdfmill::error::PdfMillError;
use pdfmill::io::PdfWriter;
use pdfmill::merge::Merger;
use pdfmill::output::{
    OutputFormatter, ProgressBar, display_merge_statistics, display_pdf_info,
    display_validation_summary,
};
use pdfmill::rotate::rotate_pdf;
use pdfmill::split::Splitter;
use pdfmill::validation::Validator;
use pdfmill::watermark::apply_watermark;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked from the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "pdfmill=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Dispatch to the selected subcommand.
async fn run(cli: Cli) -> Result<(), PdfMillError> {
    let (verbose, quiet) = (cli.verbose, cli.quiet);

    match cli.command {
        Command::Merge(args) => run_merge(&args, verbose, quiet).await,
        Command::Split(args) => run_split(&args, verbose, quiet).await,
        Command::Rotate(args) => run_rotate(&args, verbose, quiet).await,
        Command::Watermark(args) => run_watermark(&args, verbose, quiet).await,
        Command::Convert(args) => run_convert(&args, verbose, quiet).await,
        Command::Info(args) => run_info(&args, verbose, quiet).await,
    }
}

async fn run_merge(args: &MergeArgs, verbose: bool, quiet: bool) -> Result<(), PdfMillError> {
    let mut config = args.to_config(verbose, quiet).await?;
    let formatter = OutputFormatter::from_settings(&config.settings);

    if config.settings.dry_run {
        formatter.info("Validating input files...");
        let validator = Validator::new();
        let summary = validator
            .validate_inputs(&config.inputs, config.continue_on_error)
            .await?;
        display_validation_summary(&formatter, &summary);

        validator
            .validate_output(
                &config.output,
                &config.inputs,
                config.settings.overwrite_mode,
            )
            .await?;

        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the merged PDF");
        return Ok(());
    }

    confirm_overwrite(
        std::slice::from_ref(&config.output),
        &mut config.settings,
        &formatter,
    )?;

    formatter.info(&format!("Merging {} file(s)...", config.inputs.len()));

    let mut progress = ProgressBar::visible_if(config.inputs.len(), formatter.should_print());
    progress.set_message("Loading");
    let merged = Merger::new()
        .merge_with_progress(&config, |_, _| progress.increment())
        .await;
    progress.finish();
    let result = merged?;

    for (path, reason) in &result.skipped {
        formatter.warning(&format!("Skipped {}: {reason}", path.display()));
    }
    for path in &result.merged_files {
        debug!(path = %path.display(), "merged");
    }

    formatter.info(&format!("Writing to: {}", config.output.display()));
    let written = PdfWriter::new()
        .with_compression(config.settings.compression)
        .save_with_stats(&result.document, &config.output)
        .await?;

    display_merge_statistics(&formatter, &result.statistics, &written);
    Ok(())
}

async fn run_split(args: &SplitArgs, verbose: bool, quiet: bool) -> Result<(), PdfMillError> {
    let mut config = args.to_config(verbose, quiet)?;
    let formatter = OutputFormatter::from_settings(&config.settings);

    if !config.settings.dry_run {
        confirm_overwrite(&config.output_paths()?, &mut config.settings, &formatter)?;
    }

    let outcomes = Splitter::new().split(&config).await?;

    for outcome in &outcomes {
        match &outcome.statistics {
            Some(stats) => formatter.success(&format!(
                "Pages {} -> {} ({})",
                outcome.span,
                outcome.output.display(),
                stats.format_file_size()
            )),
            None => formatter.info(&format!(
                "Pages {} would be written to {}",
                outcome.span,
                outcome.output.display()
            )),
        }
    }

    if config.settings.dry_run {
        formatter.success("Dry run completed successfully");
    }
    Ok(())
}

async fn run_rotate(args: &RotateArgs, verbose: bool, quiet: bool) -> Result<(), PdfMillError> {
    let mut config = args.to_config(verbose, quiet)?;
    let formatter = OutputFormatter::from_settings(&config.settings);

    if !config.settings.dry_run {
        confirm_overwrite(
            std::slice::from_ref(&config.output),
            &mut config.settings,
            &formatter,
        )?;
    }

    let outcome = rotate_pdf(&config).await?;

    match &outcome.statistics {
        Some(stats) => formatter.success(&format!(
            "Rotated {} page(s) into {} ({})",
            outcome.pages_rotated,
            outcome.output.display(),
            stats.format_file_size()
        )),
        None => {
            formatter.info(&format!(
                "{} page(s) would be rotated into {}",
                outcome.pages_rotated,
                outcome.output.display()
            ));
            formatter.success("Dry run completed successfully");
        }
    }
    Ok(())
}

async fn run_watermark(
    args: &WatermarkArgs,
    verbose: bool,
    quiet: bool,
) -> Result<(), PdfMillError> {
    let mut config = args.to_config(verbose, quiet)?;
    let formatter = OutputFormatter::from_settings(&config.settings);

    if !config.settings.dry_run {
        confirm_overwrite(
            std::slice::from_ref(&config.output),
            &mut config.settings,
            &formatter,
        )?;
    }

    let outcome = apply_watermark(&config).await?;

    match &outcome.statistics {
        Some(stats) => formatter.success(&format!(
            "Watermarked {} page(s) into {} ({})",
            outcome.pages_marked,
            outcome.output.display(),
            stats.format_file_size()
        )),
        None => {
            formatter.info(&format!(
                "{} page(s) would be watermarked into {}",
                outcome.pages_marked,
                outcome.output.display()
            ));
            formatter.success("Dry run completed successfully");
        }
    }
    Ok(())
}

async fn run_convert(args: &ConvertArgs, verbose: bool, quiet: bool) -> Result<(), PdfMillError> {
    let mut config = args.to_config(verbose, quiet)?;
    let formatter = OutputFormatter::from_settings(&config.settings);

    if !config.settings.dry_run {
        confirm_overwrite(&config.output_paths()?, &mut config.settings, &formatter)?;
    }

    let outcomes = convert_images(&config).await?;

    for outcome in &outcomes {
        match &outcome.statistics {
            Some(stats) => formatter.success(&format!(
                "{} -> {} ({})",
                outcome.input.display(),
                outcome.output.display(),
                stats.format_file_size()
            )),
            None => formatter.info(&format!(
                "{} would be written to {}",
                outcome.input.display(),
                outcome.output.display()
            )),
        }
    }
    Ok(())
}

async fn run_info(args: &InfoArgs, verbose: bool, quiet: bool) -> Result<(), PdfMillError> {
    args.validate(verbose)?;
    let formatter = OutputFormatter::new(quiet, verbose);
    let validator = Validator::new();

    let mut infos = Vec::with_capacity(args.inputs.len());
    let mut first_error = None;
    for path in &args.inputs {
        match validator.validate_file(path).await {
            Ok(info) => infos.push(info),
            Err(e) if args.continue_on_error && e.is_recoverable() => {
                if !args.json {
                    formatter.warning(&format!("{}: {e}", path.display()));
                }
                first_error.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }

    if infos.is_empty() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&infos)
            .map_err(|e| PdfMillError::other(format!("Failed to serialize info: {e}")))?;
        formatter.raw(&json);
    } else {
        for info in &infos {
            display_pdf_info(&formatter, info);
        }
    }
    Ok(())
}

/// Ask before overwriting existing outputs.
///
/// On confirmation the settings switch to [`OverwriteMode::Force`] so the
/// library writes without checking again. Quiet mode never prompts and
/// behaves like `--no-clobber`.
fn confirm_overwrite(
    outputs: &[PathBuf],
    settings: &mut OutputSettings,
    formatter: &OutputFormatter,
) -> Result<(), PdfMillError> {
    if settings.overwrite_mode != OverwriteMode::Prompt {
        return Ok(());
    }

    let existing: Vec<&PathBuf> = outputs.iter().filter(|p| p.is_file()).collect();
    let Some(first) = existing.first() else {
        return Ok(());
    };

    if formatter.is_quiet() {
        return Err(PdfMillError::output_exists((*first).clone()));
    }

    for path in &existing {
        formatter.warning(&format!("Output file already exists: {}", path.display()));
    }

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .map_err(|err| PdfMillError::other(format!("Failed to read input: {err}")))?;

    let response = response.trim().to_lowercase();
    if response == "y" || response == "yes" {
        settings.overwrite_mode = OverwriteMode::Force;
        Ok(())
    } else {
        Err(PdfMillError::Cancelled)
    }
}
