//! Shared fixtures for the integration tests.
//!
//! Documents and images are generated into a temporary directory, so no
//! binary fixtures live in the repository. Every page draws the text
//! `"<stem> p<n>"`, which [`page_labels`] reads back.

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding generated inputs.
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path inside the fixture directory that does not exist yet.
    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a PDF with `pages` labelled pages.
    pub fn pdf(&self, name: &str, pages: usize) -> PathBuf {
        let path = self.dir.path().join(name);
        let label = Path::new(name).file_stem().unwrap().to_string_lossy();
        labelled_pdf(&label, pages)
            .save(&path)
            .expect("Failed to write fixture PDF");
        path
    }

    /// Write an RGB image; the format follows the extension.
    pub fn image(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.dir.path().join(name);
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 90]));
        DynamicImage::ImageRgb8(image)
            .save(&path)
            .expect("Failed to write fixture image");
        path
    }

    /// Write arbitrary bytes.
    pub fn raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture file");
        path
    }
}

fn labelled_pdf(label: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
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
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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

/// The text drawn on each page, in page order.
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

/// Load a written PDF back from disk.
pub fn reload(path: &Path) -> Document {
    Document::load(path).expect("Failed to reload output PDF")
}
