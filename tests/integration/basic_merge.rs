//! Integration tests for merging PDFs end to end.

use pdfmill::collect::{CollectOptions, collect_inputs};
use pdfmill::config::{CompressionLevel, MergeConfig, Metadata};
use pdfmill::io::PdfWriter;
use pdfmill::merge::{Merger, MetadataManager};
use pdfmill::utils::decode_text_string;
use rstest::rstest;

use crate::common::{Fixtures, page_labels, reload};

#[tokio::test]
async fn test_merge_keeps_input_and_page_order() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 2);
    let b = fx.pdf("b.pdf", 3);
    let c = fx.pdf("c.pdf", 1);
    let output = fx.output("merged.pdf");

    let config = MergeConfig::new(vec![c, a, b], output.clone());
    let result = Merger::new().merge(&config).await.unwrap();
    assert_eq!(result.statistics.files_merged, 3);
    assert_eq!(result.statistics.total_pages, 6);

    PdfWriter::new()
        .save(&result.document, &output)
        .await
        .unwrap();

    let merged = reload(&output);
    assert_eq!(
        page_labels(&merged),
        vec!["c p1", "a p1", "a p2", "b p1", "b p2", "b p3"]
    );
}

#[tokio::test]
async fn test_merge_same_file_twice() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 2);

    let config = MergeConfig::new(vec![a.clone(), a], fx.output("twice.pdf"));
    let result = Merger::new().merge(&config).await.unwrap();

    assert_eq!(
        page_labels(&result.document),
        vec!["a p1", "a p2", "a p1", "a p2"]
    );
}

#[tokio::test]
async fn test_merge_directory_in_natural_order() {
    let fx = Fixtures::new();
    fx.pdf("page10.pdf", 1);
    fx.pdf("page2.pdf", 1);
    fx.pdf("page1.pdf", 1);
    fx.raw("notes.txt", b"not a pdf");

    let inputs = collect_inputs(&[fx.path().to_path_buf()], &CollectOptions::default()).unwrap();
    let config = MergeConfig::new(inputs, fx.output("out.pdf"));
    let result = Merger::new().merge(&config).await.unwrap();

    assert_eq!(
        page_labels(&result.document),
        vec!["page1 p1", "page2 p1", "page10 p1"]
    );
}

#[tokio::test]
async fn test_bookmarks_survive_writing() {
    let fx = Fixtures::new();
    let intro = fx.pdf("intro.pdf", 2);
    let body = fx.pdf("body.pdf", 4);
    let output = fx.output("book.pdf");

    let mut config = MergeConfig::new(vec![intro, body], output.clone());
    config.bookmarks = true;

    let result = Merger::new().merge(&config).await.unwrap();
    assert_eq!(result.statistics.bookmarks_added, 2);
    PdfWriter::new()
        .save(&result.document, &output)
        .await
        .unwrap();

    let doc = reload(&output);
    let outlines_id = doc
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .and_then(|o| o.as_reference())
        .unwrap();
    let outlines = doc.get_dictionary(outlines_id).unwrap();
    let first_id = outlines.get(b"First").unwrap().as_reference().unwrap();
    let first = doc.get_dictionary(first_id).unwrap();
    let title = first.get(b"Title").unwrap().as_str().unwrap();
    assert_eq!(decode_text_string(title), "intro");

    let second_id = first.get(b"Next").unwrap().as_reference().unwrap();
    let second = doc.get_dictionary(second_id).unwrap();
    let dest = second.get(b"Dest").unwrap().as_array().unwrap();
    let target = dest[0].as_reference().unwrap();
    let third_page = doc.get_pages()[&3];
    assert_eq!(target, third_page);
}

#[tokio::test]
async fn test_metadata_is_written() {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 1);
    let output = fx.output("meta.pdf");

    let mut config = MergeConfig::new(vec![a], output.clone());
    config.metadata = Metadata::new(
        Some("Quarterly Report".to_string()),
        Some("Finance".to_string()),
        None,
        None,
    );

    let result = Merger::new().merge(&config).await.unwrap();
    PdfWriter::new()
        .save(&result.document, &output)
        .await
        .unwrap();

    let written = MetadataManager::new().get_metadata(&reload(&output));
    assert_eq!(written.title.as_deref(), Some("Quarterly Report"));
    assert_eq!(written.author.as_deref(), Some("Finance"));
    assert!(written.subject.is_none());
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_every_compression_level_writes_a_loadable_pdf(#[case] level: CompressionLevel) {
    let fx = Fixtures::new();
    let a = fx.pdf("a.pdf", 2);
    let b = fx.pdf("b.pdf", 2);
    let output = fx.output("out.pdf");

    let config = MergeConfig::new(vec![a, b], output.clone());
    let result = Merger::new().merge(&config).await.unwrap();

    let stats = PdfWriter::new()
        .with_compression(level)
        .save_with_stats(&result.document, &output)
        .await
        .unwrap();
    assert!(stats.file_size > 0);
    assert_eq!(reload(&output).get_pages().len(), 4);
}
