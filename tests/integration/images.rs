//! Integration tests for image inputs.

use pdfmill::config::{ConvertConfig, MergeConfig, OutputSettings, OverwriteMode};
use pdfmill::error::PdfMillError;
use pdfmill::convert::{ImageConverter, convert_images};
use pdfmill::merge::Merger;
use pdfmill::validation::page_dimensions;
use rstest::rstest;

use crate::common::{Fixtures, reload};

#[rstest]
#[case("photo.png")]
#[case("photo.jpg")]
#[case("photo.bmp")]
#[case("photo.tiff")]
#[tokio::test]
async fn test_image_page_matches_pixel_size(#[case] name: &str) {
    let fx = Fixtures::new();
    let image = fx.image(name, 120, 80);

    let doc = ImageConverter::new().to_document(&image).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let dims = page_dimensions(&doc, pages[&1]).unwrap();
    assert_eq!(dims.width, 120.0);
    assert_eq!(dims.height, 80.0);
}

#[tokio::test]
async fn test_convert_images_writes_one_pdf_each() {
    let fx = Fixtures::new();
    let first = fx.image("first.png", 10, 20);
    let second = fx.image("second.jpg", 30, 40);
    let out_dir = fx.output("pdfs");

    let config = ConvertConfig {
        inputs: vec![first, second],
        output_dir: Some(out_dir.clone()),
        settings: OutputSettings::default(),
    };
    let outcomes = convert_images(&config).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].output, out_dir.join("first.pdf"));
    assert_eq!(outcomes[1].output, out_dir.join("second.pdf"));

    let doc = reload(&outcomes[1].output);
    let page = doc.get_pages()[&1];
    let dims = page_dimensions(&doc, page).unwrap();
    assert_eq!((dims.width, dims.height), (30.0, 40.0));
}

#[tokio::test]
async fn test_merge_images_only() {
    let fx = Fixtures::new();
    let a = fx.image("a.png", 50, 50);
    let b = fx.image("b.jpg", 64, 48);

    let config = MergeConfig::new(vec![a, b], fx.output("album.pdf"));
    let result = Merger::new().merge(&config).await.unwrap();

    assert_eq!(result.statistics.total_pages, 2);
    assert_eq!(result.statistics.images_converted, 2);

    let pages = result.document.get_pages();
    let second = page_dimensions(&result.document, pages[&2]).unwrap();
    assert_eq!((second.width, second.height), (64.0, 48.0));
}

#[tokio::test]
async fn test_undecodable_image_is_an_error() {
    let fx = Fixtures::new();
    let broken = fx.raw("broken.png", b"definitely not a png");

    let config = MergeConfig::new(vec![broken], fx.output("out.pdf"));
    assert!(Merger::new().merge(&config).await.is_err());
}

#[tokio::test]
async fn test_convert_refuses_images_with_the_same_stem() {
    let fx = Fixtures::new();
    let jpg = fx.image("scan.jpg", 12, 12);
    let png = fx.image("scan.png", 24, 24);

    let config = ConvertConfig {
        inputs: vec![jpg, png],
        output_dir: None,
        settings: OutputSettings {
            overwrite_mode: OverwriteMode::NoClobber,
            ..Default::default()
        },
    };

    let err = convert_images(&config).await.unwrap_err();
    assert!(matches!(err, PdfMillError::InvalidConfig { .. }));
    assert!(!fx.path().join("scan.pdf").exists());
}
