//! Builders for the documents and images used by unit tests.
//!
//! Every page carries a content stream that draws `"<label> p<n>"`, so tests
//! can tell pages apart after merging or splitting. `MediaBox` and the font
//! resource sit on the page tree root and are inherited by the pages.

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use std::path::{Path, PathBuf};

/// A document with `pages` pages labelled `"doc p1"`, `"doc p2"`, ...
pub fn create_multi_page_pdf(pages: usize) -> Document {
    create_labelled_pdf("doc", pages)
}

/// A document with `pages` pages labelled `"<label> p1"`, ...
pub fn create_labelled_pdf(label: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{label} p{n}").into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a labelled PDF named `name` into `dir`; the label is the file stem.
pub fn save_test_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let label = Path::new(name).file_stem().unwrap().to_string_lossy();
    let path = dir.join(name);
    create_labelled_pdf(&label, pages).save(&path).unwrap();
    path
}

/// Write a gradient image; the format follows the extension of `name`.
pub fn save_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]));
    DynamicImage::ImageRgb8(image).save(&path).unwrap();
    path
}

/// The label drawn on each page, in page order.
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap_or_default();
            let text = String::from_utf8_lossy(&content);
            match (text.find('('), text.rfind(')')) {
                (Some(start), Some(end)) if start < end => text[start + 1..end].to_string(),
                _ => String::new(),
            }
        })
        .collect()
}
