//! Integration tests for error handling and edge cases.

use pdfmill::config::{MergeConfig, OverwriteMode, SplitConfig, SplitDefinition};
use pdfmill::error::PdfMillError;
use pdfmill::merge::Merger;
use pdfmill::split::Splitter;
use pdfmill::validation::Validator;
use std::path::PathBuf;
use std::str::FromStr;

use crate::common::Fixtures;

#[tokio::test]
async fn test_error_nonexistent_input() {
    let fx = Fixtures::new();
    let config = MergeConfig::new(
        vec![PathBuf::from("/nonexistent/file.pdf")],
        fx.output("out.pdf"),
    );

    let err = Merger::new().merge(&config).await.unwrap_err();
    assert!(matches!(err, PdfMillError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_empty_input_list() {
    let fx = Fixtures::new();
    let config = MergeConfig::new(vec![], fx.output("out.pdf"));
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_error_not_a_pdf() {
    let fx = Fixtures::new();
    let fake = fx.raw("fake.pdf", b"This is not a PDF file");

    let err = Validator::new().validate_file(&fake).await.unwrap_err();
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_error_empty_pdf_file() {
    let fx = Fixtures::new();
    let empty = fx.raw("empty.pdf", b"");

    let err = Validator::new().validate_file(&empty).await.unwrap_err();
    assert!(matches!(err, PdfMillError::CorruptedPdf { .. }));
}

#[tokio::test]
async fn test_continue_on_error_skips_broken_input() {
    let fx = Fixtures::new();
    let good = fx.pdf("good.pdf", 2);
    let bad = fx.raw("bad.pdf", b"%PDF-1.4 truncated");

    let mut config = MergeConfig::new(vec![bad.clone(), good.clone()], fx.output("out.pdf"));
    config.continue_on_error = true;

    let result = Merger::new().merge(&config).await.unwrap();
    assert_eq!(result.merged_files, vec![good]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].0, bad);
    assert_eq!(result.statistics.total_pages, 2);
}

#[tokio::test]
async fn test_error_page_range_past_end() {
    let fx = Fixtures::new();
    let input = fx.pdf("short.pdf", 3);

    let config = SplitConfig {
        input,
        output: None,
        output_dir: None,
        definitions: vec![
            SplitDefinition::from_str("1-2").unwrap(),
            SplitDefinition::from_str("3-7").unwrap(),
        ],
        settings: Default::default(),
    };

    let err = Splitter::new().split(&config).await.unwrap_err();
    assert!(matches!(
        err,
        PdfMillError::InvalidPageRange { total_pages: 3, .. }
    ));
    // Nothing is written when any span is invalid.
    assert!(!fx.path().join("short_1-2.pdf").exists());
}

#[tokio::test]
async fn test_error_output_is_input() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 1);

    let err = Validator::new()
        .validate_output(&a, std::slice::from_ref(&a), OverwriteMode::Force)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfMillError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_error_output_exists_with_no_clobber() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 1);
    let existing = fx.pdf("existing.pdf", 1);

    let err = Validator::new()
        .validate_output(&existing, &[a], OverwriteMode::NoClobber)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfMillError::OutputExists { .. }));
}

#[tokio::test]
async fn test_error_output_aliases_an_input() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 1);
    let b = fx.pdf("b.pdf", 1);
    std::fs::create_dir(fx.path().join("sub")).unwrap();

    let config = MergeConfig::new(vec![a.clone(), b], fx.path().join("sub/../a.pdf"));
    let err = Merger::new().merge(&config).await.unwrap_err();

    assert!(matches!(err, PdfMillError::InvalidConfig { .. }));
    assert_eq!(crate::common::reload(&a).get_pages().len(), 1);
}
