//! Integration tests for text watermarks.

use lopdf::{Document, Object};
use pdfmill::config::{
    HexColor, OutputSettings, OverwriteMode, PageSpan, StandardFont, WatermarkConfig,
    WatermarkPosition,
};
use pdfmill::error::PdfMillError;
use pdfmill::watermark::apply_watermark;

use crate::common::{Fixtures, reload};

fn content_of(doc: &Document, page: u32) -> String {
    let page_id = doc.get_pages()[&page];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// `BaseFont` names of the fonts a page can use, following inheritance.
fn page_fonts(doc: &Document, page: u32) -> Vec<String> {
    let deref = |object: &Object| match object {
        Object::Reference(id) => doc.get_dictionary(*id).unwrap().clone(),
        other => other.as_dict().unwrap().clone(),
    };

    let mut node = doc.get_dictionary(doc.get_pages()[&page]).unwrap();
    let resources = loop {
        match node.get(b"Resources") {
            Ok(resources) => break deref(resources),
            Err(_) => {
                let parent = node.get(b"Parent").unwrap().as_reference().unwrap();
                node = doc.get_dictionary(parent).unwrap();
            }
        }
    };

    deref(resources.get(b"Font").unwrap())
        .iter()
        .map(|(_, font)| {
            let name = deref(font).get(b"BaseFont").unwrap().as_name().unwrap().to_vec();
            String::from_utf8(name).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_watermark_selected_pages_of_a4_document() {
    let fx = Fixtures::new();
    let input = fx.pdf("contract.pdf", 3);
    let output = fx.output("contract-marked.pdf");

    let config = WatermarkConfig {
        font: StandardFont::TimesRoman,
        font_size: 48.0,
        color: "#CC0000".parse::<HexColor>().unwrap(),
        opacity: 0.25,
        rotation: 45.0,
        position: WatermarkPosition::Center,
        pages: vec![PageSpan::new(2, 2).unwrap()],
        ..WatermarkConfig::new(input.clone(), output.clone(), "TOP SECRET")
    };
    let outcome = apply_watermark(&config).await.unwrap();
    assert_eq!(outcome.pages_marked, 1);

    let doc = reload(&output);
    assert_eq!(doc.get_pages().len(), 3);

    let marked = content_of(&doc, 2);
    assert!(marked.contains("(contract p2) Tj"));
    assert!(marked.contains("(TOP SECRET) Tj"));
    assert!(page_fonts(&doc, 2).contains(&"Times-Roman".to_string()));

    for page in [1, 3] {
        assert!(!content_of(&doc, page).contains("TOP SECRET"));
        assert_eq!(page_fonts(&doc, page), vec!["Courier".to_string()]);
    }
}

#[tokio::test]
async fn test_watermark_refuses_existing_output_with_no_clobber() {
    let fx = Fixtures::new();
    let input = fx.pdf("report.pdf", 1);
    let output = fx.raw("taken.pdf", b"keep me");

    let config = WatermarkConfig {
        settings: OutputSettings {
            overwrite_mode: OverwriteMode::NoClobber,
            ..Default::default()
        },
        ..WatermarkConfig::new(input, output.clone(), "DRAFT")
    };

    assert!(matches!(
        apply_watermark(&config).await,
        Err(PdfMillError::OutputExists { .. })
    ));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_watermark_rejects_empty_text() {
    let fx = Fixtures::new();
    let input = fx.pdf("report.pdf", 1);
    let output = fx.output("out.pdf");

    let config = WatermarkConfig::new(input, output.clone(), "   ");
    assert!(matches!(
        apply_watermark(&config).await,
        Err(PdfMillError::InvalidConfig { .. })
    ));
    assert!(!output.exists());
}
