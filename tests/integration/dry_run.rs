//! Integration tests for dry-run mode.

use pdfmill::config::{
    ConvertConfig, OutputSettings, RotateConfig, RotateDefinition, SplitConfig, SplitDefinition,
};
use pdfmill::convert::convert_images;
use pdfmill::rotate::rotate_pdf;
use pdfmill::split::Splitter;
use pdfmill::validation::Validator;
use std::str::FromStr;

use crate::common::Fixtures;

fn dry_run() -> OutputSettings {
    OutputSettings {
        dry_run: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_dry_run_validation_summary() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 3);
    let b = fx.image("b.png", 8, 8);

    let summary = Validator::new()
        .validate_inputs(&[a, b], false)
        .await
        .unwrap();

    assert_eq!(summary.files_validated, 2);
    assert_eq!(summary.total_pages, 4);
    assert!(summary.failures.is_empty());
}

#[tokio::test]
async fn test_dry_run_split_writes_nothing() {
    let fx = Fixtures::new();
    let input = fx.pdf("doc.pdf", 4);

    let config = SplitConfig {
        input,
        output: None,
        output_dir: None,
        definitions: vec![SplitDefinition::from_str("1-2").unwrap()],
        settings: dry_run(),
    };
    let outcomes = Splitter::new().split(&config).await.unwrap();

    assert!(outcomes[0].statistics.is_none());
    assert!(!outcomes[0].output.exists());
}

#[tokio::test]
async fn test_dry_run_rotate_writes_nothing() {
    let fx = Fixtures::new();
    let input = fx.pdf("doc.pdf", 2);
    let output = fx.output("rotated.pdf");

    let config = RotateConfig {
        input,
        output: output.clone(),
        definitions: vec![RotateDefinition::from_str("1-2:90").unwrap()],
        settings: dry_run(),
    };
    let outcome = rotate_pdf(&config).await.unwrap();

    assert_eq!(outcome.pages_rotated, 2);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_dry_run_convert_writes_nothing() {
    let fx = Fixtures::new();
    let image = fx.image("photo.png", 4, 4);

    let config = ConvertConfig {
        inputs: vec![image],
        output_dir: None,
        settings: dry_run(),
    };
    let outcomes = convert_images(&config).await.unwrap();

    assert_eq!(outcomes[0].output, fx.path().join("photo.pdf"));
    assert!(!outcomes[0].output.exists());
}
