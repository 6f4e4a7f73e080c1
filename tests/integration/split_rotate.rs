//! Integration tests for splitting and rotating.

use pdfmill::config::{
    OutputSettings, OverwriteMode, PageSpan, RotateConfig, RotateDefinition, SplitConfig,
    SplitDefinition,
};
use pdfmill::pages::PageExtractor;
use pdfmill::rotate::rotate_pdf;
use pdfmill::split::Splitter;
use std::str::FromStr;

use crate::common::{Fixtures, page_labels, reload};

fn split_config(fx: &Fixtures, input: &str, ranges: &[&str]) -> SplitConfig {
    SplitConfig {
        input: fx.path().join(input),
        output: None,
        output_dir: None,
        definitions: ranges
            .iter()
            .map(|r| SplitDefinition::from_str(r).unwrap())
            .collect(),
        settings: OutputSettings::default(),
    }
}

#[tokio::test]
async fn test_split_chapter_out_of_a_book() {
    let fx = Fixtures::new();
    let book = fx.pdf("book.pdf", 50);
    let output = fx.output("chapter3.pdf");

    let config = SplitConfig {
        input: book,
        output: Some(output.clone()),
        output_dir: None,
        definitions: vec![SplitDefinition::new(PageSpan::new(41, 44).unwrap(), None)],
        settings: OutputSettings::default(),
    };
    Splitter::new().split(&config).await.unwrap();

    assert_eq!(
        page_labels(&reload(&output)),
        vec!["book p41", "book p42", "book p43", "book p44"]
    );
}

#[tokio::test]
async fn test_split_into_several_files() {
    let fx = Fixtures::new();
    fx.pdf("report.pdf", 6);

    let config = split_config(&fx, "report.pdf", &["1-1:cover", "2-6"]);
    let outcomes = Splitter::new().split(&config).await.unwrap();

    assert_eq!(outcomes[0].output, fx.path().join("cover.pdf"));
    assert_eq!(outcomes[1].output, fx.path().join("report_2-6.pdf"));
    assert_eq!(page_labels(&reload(&outcomes[0].output)), vec!["report p1"]);
    assert_eq!(reload(&outcomes[1].output).get_pages().len(), 5);
}

#[tokio::test]
async fn test_split_leaves_input_untouched() {
    let fx = Fixtures::new();
    let input = fx.pdf("source.pdf", 3);
    let before = std::fs::read(&input).unwrap();

    let config = split_config(&fx, "source.pdf", &["2-3"]);
    Splitter::new().split(&config).await.unwrap();

    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[tokio::test]
async fn test_rotate_ranges_add_up() {
    let fx = Fixtures::new();
    let input = fx.pdf("scan.pdf", 4);
    let output = fx.output("fixed.pdf");

    let config = RotateConfig {
        input,
        output: output.clone(),
        definitions: ["1-2:90", "2-3:180", "4:-90"]
            .iter()
            .map(|r| RotateDefinition::from_str(r).unwrap())
            .collect(),
        settings: OutputSettings::default(),
    };
    let outcome = rotate_pdf(&config).await.unwrap();
    assert_eq!(outcome.pages_rotated, 5);

    let doc = reload(&output);
    let extractor = PageExtractor::new();
    let rotations: Vec<i64> = doc
        .get_pages()
        .values()
        .map(|&id| extractor.rotation_of(&doc, id))
        .collect();
    assert_eq!(rotations, vec![90, 270, 180, 270]);
    assert_eq!(
        page_labels(&doc),
        vec!["scan p1", "scan p2", "scan p3", "scan p4"]
    );
}

#[tokio::test]
async fn test_rotate_refuses_existing_output_with_no_clobber() {
    let fx = Fixtures::new();
    let input = fx.pdf("scan.pdf", 1);
    let output = fx.raw("taken.pdf", b"keep me");

    let config = RotateConfig {
        input,
        output: output.clone(),
        definitions: vec![RotateDefinition::from_str("1:180").unwrap()],
        settings: OutputSettings {
            overwrite_mode: OverwriteMode::NoClobber,
            ..Default::default()
        },
    };

    assert!(rotate_pdf(&config).await.is_err());
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}
