//! Image to PDF conversion.
//!
//! Every image becomes a one-page document whose page is exactly the image's
//! pixel size in points (one pixel per point, i.e. 72 dpi). The image is
//! drawn over the whole page.
//!
//! JPEG files with one or three 8-bit components are embedded untouched with
//! the `DCTDecode` filter, so no generation loss is introduced. Everything
//! else is decoded and stored as 8-bit gray or RGB samples, Flate-compressed.
//! Alpha channels are dropped.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::convert::ImageConverter;
//! use std::path::Path;
//!
//! # fn example() -> pdfmill::Result<()> {
//! let converter = ImageConverter::new();
//! let converted = converter.load(Path::new("scan.jpg"))?;
//! println!("{}x{} pt", converted.width, converted.height);
//! # Ok(())
//! # }
//! ```

use image::{DynamicImage, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::error::{PdfMillError, Result};
use crate::io::{PdfWriter, WriteStatistics};

/// Name of the image XObject in the page resources.
const IMAGE_NAME: &str = "Im0";

/// How the image samples ended up in the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedding {
    /// Original JPEG bytes, `DCTDecode`.
    Jpeg,
    /// Decoded samples, `FlateDecode`.
    Decoded,
}

/// A converted image.
#[derive(Debug)]
pub struct ConvertedImage {
    /// One-page document showing the image.
    pub document: Document,

    /// Page width in points (= image width in pixels).
    pub width: u32,

    /// Page height in points (= image height in pixels).
    pub height: u32,

    /// How the samples were embedded.
    pub embedding: Embedding,
}

/// Outcome of converting one image file to a PDF file.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Source image.
    pub input: PathBuf,

    /// Written PDF (or the path it would be written to in a dry run).
    pub output: PathBuf,

    /// Write statistics; `None` for dry runs.
    pub statistics: Option<WriteStatistics>,
}

/// Converts raster images to single-page PDF documents.
#[derive(Debug, Clone, Default)]
pub struct ImageConverter;

impl ImageConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self
    }

    /// Read and convert an image file.
    ///
    /// This is blocking; async callers run it on `spawn_blocking`.
    pub fn load(&self, path: &Path) -> Result<ConvertedImage> {
        if !path.exists() {
            return Err(PdfMillError::file_not_found(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(PdfMillError::not_a_file(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|e| PdfMillError::FileNotAccessible {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.convert_bytes(&bytes)
            .map_err(|e| PdfMillError::failed_to_convert_image(path.to_path_buf(), e.to_string()))
    }

    /// Convert an image file into a one-page document.
    pub fn to_document(&self, path: &Path) -> Result<Document> {
        self.load(path).map(|converted| converted.document)
    }

    /// Convert encoded image bytes.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ConvertedImage> {
        let (image, width, height, embedding) = match JpegInfo::parse(bytes) {
            Some(jpeg) => (
                jpeg_stream(bytes, &jpeg),
                jpeg.width,
                jpeg.height,
                Embedding::Jpeg,
            ),
            None => {
                let decoded = ImageReader::new(Cursor::new(bytes))
                    .with_guessed_format()?
                    .decode()
                    .map_err(|e| PdfMillError::other(e.to_string()))?;
                let (width, height) = (decoded.width(), decoded.height());
                (sample_stream(decoded)?, width, height, Embedding::Decoded)
            }
        };

        if width == 0 || height == 0 {
            return Err(PdfMillError::other("image has no pixels"));
        }

        let document = single_page_document(image, width, height)?;
        debug!(width, height, ?embedding, "converted image");

        Ok(ConvertedImage {
            document,
            width,
            height,
            embedding,
        })
    }

    /// Convert an image file and write it as a PDF.
    pub async fn convert_file(
        &self,
        image: &Path,
        output: &Path,
        writer: &PdfWriter,
    ) -> Result<WriteStatistics> {
        let converter = self.clone();
        let source = image.to_path_buf();

        let converted = tokio::task::spawn_blocking(move || converter.load(&source))
            .await
            .map_err(|e| PdfMillError::other(format!("Conversion task failed: {e}")))??;

        writer.save_with_stats(&converted.document, output).await
    }
}

/// Convert every image of `config` to a PDF file.
///
/// Outputs are checked against the overwrite mode before anything is
/// written. Dry runs only report the planned outputs.
pub async fn convert_images(config: &ConvertConfig) -> Result<Vec<ConvertOutcome>> {
    config.validate()?;

    let writer = PdfWriter::new().with_compression(config.settings.compression);
    let converter = ImageConverter::new();

    let plan: Vec<(PathBuf, PathBuf)> = config
        .inputs
        .iter()
        .cloned()
        .zip(config.output_paths()?)
        .collect();

    for (_, output) in &plan {
        writer
            .check_overwrite(output, config.settings.overwrite_mode)
            .await?;
    }

    let mut outcomes = Vec::with_capacity(plan.len());
    for (input, output) in plan {
        let statistics = if config.settings.dry_run {
            None
        } else {
            let stats = converter.convert_file(&input, &output, &writer).await?;
            info!(input = %input.display(), output = %output.display(), "converted image");
            Some(stats)
        };

        outcomes.push(ConvertOutcome {
            input,
            output,
            statistics,
        });
    }

    Ok(outcomes)
}

/// The parts of a JPEG header needed to embed it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegInfo {
    width: u32,
    height: u32,
    components: u8,
}

impl JpegInfo {
    /// Read the frame header of a JPEG that PDF readers can decode as is.
    ///
    /// Returns `None` for anything else (not a JPEG, CMYK, 12-bit, lossless
    /// or arithmetic-coded), which is then decoded instead.
    fn parse(bytes: &[u8]) -> Option<Self> {
        if !bytes.starts_with(&[0xFF, 0xD8]) {
            return None;
        }

        let mut pos = 2;
        while pos + 4 <= bytes.len() {
            if bytes[pos] != 0xFF {
                return None;
            }
            let marker = bytes[pos + 1];
            match marker {
                0xFF => {
                    pos += 1;
                    continue;
                }
                0x01 | 0xD0..=0xD7 => {
                    pos += 2;
                    continue;
                }
                0xD9 | 0xDA => return None,
                _ => {}
            }

            let length = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
            if length < 2 {
                return None;
            }

            if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
                let segment = bytes.get(pos + 4..pos + 2 + length)?;
                if !matches!(marker, 0xC0..=0xC2) || segment.len() < 6 {
                    return None;
                }

                let info = Self {
                    height: u32::from(u16::from_be_bytes([segment[1], segment[2]])),
                    width: u32::from(u16::from_be_bytes([segment[3], segment[4]])),
                    components: segment[5],
                };
                let precision = segment[0];

                return (precision == 8 && matches!(info.components, 1 | 3)).then_some(info);
            }

            pos += 2 + length;
        }

        None
    }

    fn color_space(&self) -> &'static str {
        if self.components == 1 {
            "DeviceGray"
        } else {
            "DeviceRGB"
        }
    }
}

fn jpeg_stream(bytes: &[u8], jpeg: &JpegInfo) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(jpeg.width),
        "Height" => i64::from(jpeg.height),
        "ColorSpace" => jpeg.color_space(),
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };

    let mut stream = Stream::new(dict, bytes.to_vec());
    stream.allows_compression = false;
    stream
}

fn sample_stream(image: DynamicImage) -> Result<Stream> {
    let (width, height) = (image.width(), image.height());
    let (color_space, samples) = if image.color().has_color() {
        ("DeviceRGB", image.into_rgb8().into_raw())
    } else {
        ("DeviceGray", image.into_luma8().into_raw())
    };

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    };

    let mut stream = Stream::new(dict, samples);
    stream.compress()?;
    Ok(stream)
}

fn single_page_document(image: Stream, width: u32, height: u32) -> Result<Document> {
    let (width, height) = (i64::from(width), i64::from(height));
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputSettings;
    use image::{GrayImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7) as u8, (y * 5) as u8, 128])
        }))
    }

    fn image_stream(doc: &Document) -> &Stream {
        doc.objects
            .values()
            .find_map(|obj| match obj {
                Object::Stream(stream)
                    if stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok()
                        == Some(b"Image".as_slice()) =>
                {
                    Some(stream)
                }
                _ => None,
            })
            .expect("document has an image XObject")
    }

    fn media_box(doc: &Document) -> Vec<i64> {
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_jpeg_is_embedded_verbatim() {
        let jpeg = encode(gradient(40, 30), ImageFormat::Jpeg);

        let converted = ImageConverter::new().convert_bytes(&jpeg).unwrap();
        assert_eq!(converted.embedding, Embedding::Jpeg);
        assert_eq!((converted.width, converted.height), (40, 30));
        assert_eq!(converted.document.get_pages().len(), 1);
        assert_eq!(media_box(&converted.document), vec![0, 0, 40, 30]);

        let stream = image_stream(&converted.document);
        assert_eq!(stream.content, jpeg);
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );
    }

    #[test]
    fn test_grayscale_jpeg_uses_device_gray() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_fn(16, 16, |x, _| {
            image::Luma([(x * 16) as u8])
        }));
        let jpeg = encode(gray, ImageFormat::Jpeg);

        let converted = ImageConverter::new().convert_bytes(&jpeg).unwrap();
        let stream = image_stream(&converted.document);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
    }

    #[test]
    fn test_png_is_decoded_to_rgb() {
        let rgba = RgbaImage::from_fn(8, 4, |x, _| Rgba([x as u8 * 30, 10, 20, 100]));
        let png = encode(DynamicImage::ImageRgba8(rgba.clone()), ImageFormat::Png);

        let converted = ImageConverter::new().convert_bytes(&png).unwrap();
        assert_eq!(converted.embedding, Embedding::Decoded);
        assert_eq!(media_box(&converted.document), vec![0, 0, 8, 4]);

        let stream = image_stream(&converted.document);
        let samples = stream.decompressed_content().unwrap();
        let expected = DynamicImage::ImageRgba8(rgba).into_rgb8().into_raw();
        assert_eq!(samples, expected);
    }

    #[test]
    fn test_grayscale_png_stays_gray() {
        let gray = GrayImage::from_fn(5, 5, |x, y| image::Luma([(x + y) as u8]));
        let png = encode(DynamicImage::ImageLuma8(gray.clone()), ImageFormat::Png);

        let converted = ImageConverter::new().convert_bytes(&png).unwrap();
        let stream = image_stream(&converted.document);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert_eq!(stream.decompressed_content().unwrap(), gray.into_raw());
    }

    #[test]
    fn test_jpeg_header_parsing() {
        let jpeg = encode(gradient(300, 200), ImageFormat::Jpeg);
        assert_eq!(
            JpegInfo::parse(&jpeg),
            Some(JpegInfo {
                width: 300,
                height: 200,
                components: 3
            })
        );

        assert_eq!(JpegInfo::parse(b"not a jpeg"), None);
        assert_eq!(JpegInfo::parse(&[0xFF, 0xD8, 0xFF]), None);
    }

    #[test]
    fn test_invalid_image_data() {
        let result = ImageConverter::new().convert_bytes(b"definitely not an image");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"garbage").unwrap();

        let err = ImageConverter::new().load(&path).unwrap_err();
        assert!(matches!(err, PdfMillError::FailedToConvertImage { .. }));

        let err = ImageConverter::new()
            .load(&dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, PdfMillError::FileNotFound { .. }));
    }

    #[test]
    fn test_converted_document_survives_save_and_load() {
        let png = encode(gradient(12, 9), ImageFormat::Png);
        let mut doc = ImageConverter::new().convert_bytes(&png).unwrap().document;

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();

        let reloaded = Document::load_mem(&buffer).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
        assert_eq!(media_box(&reloaded), vec![0, 0, 12, 9]);
    }

    #[tokio::test]
    async fn test_convert_images_writes_pdfs() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.jpg");
        let second = dir.path().join("second.png");
        std::fs::write(&first, encode(gradient(10, 10), ImageFormat::Jpeg)).unwrap();
        std::fs::write(&second, encode(gradient(20, 5), ImageFormat::Png)).unwrap();

        let out_dir = dir.path().join("pdfs");
        let config = ConvertConfig {
            inputs: vec![first, second],
            output_dir: Some(out_dir.clone()),
            settings: OutputSettings::default(),
        };

        let outcomes = convert_images(&config).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].output, out_dir.join("first.pdf"));
        assert_eq!(outcomes[1].output, out_dir.join("second.pdf"));

        for outcome in &outcomes {
            let doc = Document::load(&outcome.output).unwrap();
            assert_eq!(doc.get_pages().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_convert_images_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("photo.png");
        std::fs::write(&image, encode(gradient(4, 4), ImageFormat::Png)).unwrap();

        let config = ConvertConfig {
            inputs: vec![image],
            output_dir: None,
            settings: OutputSettings {
                dry_run: true,
                ..Default::default()
            },
        };

        let outcomes = convert_images(&config).await.unwrap();
        assert!(outcomes[0].statistics.is_none());
        assert!(!dir.path().join("photo.pdf").exists());
    }
}
