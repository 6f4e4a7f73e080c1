//! Integration tests for custom input orders.

use pdfmill::collect::{CollectOptions, collect_inputs, parse_order_list, read_order_file};
use pdfmill::config::MergeConfig;
use pdfmill::error::PdfMillError;
use pdfmill::merge::Merger;
use serial_test::serial;
use std::path::PathBuf;

use crate::common::{Fixtures, page_labels};

fn ordered(names: &str) -> CollectOptions {
    CollectOptions {
        order: Some(parse_order_list(names)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_custom_order_mixes_images_and_pdfs() {
    let fx = Fixtures::new();
    fx.pdf("letter.pdf", 2);
    fx.image("cover.png", 40, 60);
    fx.pdf("unused.pdf", 1);

    let inputs = collect_inputs(
        &[fx.path().to_path_buf()],
        &ordered("cover.png, letter.pdf"),
    )
    .unwrap();
    assert_eq!(inputs.len(), 2);

    let config = MergeConfig::new(inputs, fx.output("out.pdf"));
    let result = Merger::new().merge(&config).await.unwrap();

    assert_eq!(result.statistics.images_converted, 1);
    let labels = page_labels(&result.document);
    assert_eq!(labels.len(), 3);
    assert_eq!(&labels[1..], ["letter p1", "letter p2"]);
}

#[tokio::test]
async fn test_order_file() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 1);
    let b = fx.pdf("b.pdf", 1);
    let list = fx.raw("order.txt", b"# reading order\nb.pdf\n\na.pdf\n");

    let names = read_order_file(&list).await.unwrap();
    let options = CollectOptions {
        order: Some(names),
        ..Default::default()
    };

    let inputs = collect_inputs(&[fx.path().to_path_buf()], &options).unwrap();
    assert_eq!(inputs, vec![b, a]);
}

#[test]
fn test_custom_order_rejects_missing_file() {
    let fx = Fixtures::new();
    fx.pdf("a.pdf", 1);

    let err = collect_inputs(&[fx.path().to_path_buf()], &ordered("a.pdf,b.pdf")).unwrap_err();
    assert!(matches!(err, PdfMillError::FileNotFound { .. }));
}

#[test]
#[serial]
fn test_custom_order_defaults_to_current_directory() {
    let fx = Fixtures::new();
    fx.pdf("one.pdf", 1);
    fx.pdf("two.pdf", 1);

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(fx.path()).unwrap();
    let inputs = collect_inputs(&[], &ordered("two.pdf,one.pdf"));
    std::env::set_current_dir(previous).unwrap();

    let names: Vec<PathBuf> = inputs
        .unwrap()
        .iter()
        .map(|p| PathBuf::from(p.file_name().unwrap()))
        .collect();
    assert_eq!(names, vec![PathBuf::from("two.pdf"), PathBuf::from("one.pdf")]);
}
