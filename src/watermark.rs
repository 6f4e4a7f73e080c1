//! Text watermarks.
//!
//! The text is drawn with one of the standard Type 1 fonts, so no font
//! program is embedded. It is encoded as WinAnsi and measured with the
//! fonts' published advance widths. Positions refer to the page's
//! `MediaBox` before any `/Rotate` is applied.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmill::config::{WatermarkConfig, WatermarkPosition};
//! use pdfmill::watermark::apply_watermark;
//! use std::path::PathBuf;
//!
//! # async fn example() -> pdfmill::Result<()> {
//! let mut config = WatermarkConfig::new(
//!     PathBuf::from("report.pdf"),
//!     PathBuf::from("report-draft.pdf"),
//!     "DRAFT",
//! );
//! config.rotation = 45.0;
//! config.position = WatermarkPosition::Center;
//!
//! let outcome = apply_watermark(&config).await?;
//! println!("Stamped {} page(s)", outcome.pages_marked);
//! # Ok(())
//! # }
//! ```

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{PageSpan, StandardFont, WatermarkConfig, WatermarkPosition};
use crate::error::{PdfMillError, Result};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::validation::media_box;

/// Resource name of the watermark font.
const FONT_RESOURCE: &str = "PdfmillWmFont";

/// Resource name of the graphics state carrying the opacity.
const STATE_RESOURCE: &str = "PdfmillWmState";

/// Distance kept from the page edges, in points.
const MARGIN: f32 = 36.0;

/// Height of capital letters as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.7;

/// US Letter, for pages without a usable `MediaBox`.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum depth followed when looking up inherited resources.
const MAX_TREE_DEPTH: usize = 64;

/// Result of stamping a watermark.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    /// Output file.
    pub output: PathBuf,

    /// Number of pages that received the watermark.
    pub pages_marked: usize,

    /// Write statistics; `None` for dry runs.
    pub statistics: Option<WriteStatistics>,
}

/// Stamp the watermark described by `config` onto the selected pages of its
/// input and write the result.
///
/// Every page span is checked against the page count before anything is
/// changed. Overlapping spans stamp a page once.
pub async fn apply_watermark(config: &WatermarkConfig) -> Result<WatermarkOutcome> {
    config.validate()?;

    let writer = PdfWriter::new().with_compression(config.settings.compression);
    writer
        .check_overwrite(&config.output, config.settings.overwrite_mode)
        .await?;

    let loaded = PdfReader::new().load(&config.input).await?;
    for span in &config.pages {
        span.validate(loaded.page_count, &config.input)?;
    }

    let pages = selected_pages(&loaded.document, &config.pages);
    let pages_marked = pages.len();
    if config.settings.dry_run {
        return Ok(WatermarkOutcome {
            output: config.output.clone(),
            pages_marked,
            statistics: None,
        });
    }

    let watermark = Watermark::from_config(config);
    let mut doc = loaded.document;
    let doc = tokio::task::spawn_blocking(move || {
        watermark.stamp(&mut doc, &pages)?;
        Ok::<_, PdfMillError>(doc)
    })
    .await
    .map_err(|e| PdfMillError::page_operation_failed(format!("Watermark task failed: {e}")))??;

    let statistics = writer.save_with_stats(&doc, &config.output).await?;
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        pages = pages_marked,
        "stamped watermark"
    );

    Ok(WatermarkOutcome {
        output: config.output.clone(),
        pages_marked,
        statistics: Some(statistics),
    })
}

/// Page ids covered by `spans` in page order; every page when `spans` is empty.
fn selected_pages(doc: &Document, spans: &[PageSpan]) -> Vec<ObjectId> {
    doc.get_pages()
        .into_iter()
        .filter(|(number, _)| spans.is_empty() || spans.iter().any(|s| s.contains(*number)))
        .map(|(_, id)| id)
        .collect()
}

/// A text watermark ready to be drawn onto pages.
#[derive(Debug, Clone)]
pub struct Watermark {
    text: Vec<u8>,
    font: StandardFont,
    font_size: f32,
    color: [f32; 3],
    opacity: f32,
    rotation: f32,
    position: WatermarkPosition,
}

impl Watermark {
    /// Build the watermark drawn by `config`.
    pub fn from_config(config: &WatermarkConfig) -> Self {
        Self {
            text: encode_win_ansi(&config.text),
            font: config.font,
            font_size: config.font_size,
            color: config.color.components(),
            opacity: config.opacity,
            rotation: config.rotation,
            position: config.position,
        }
    }

    /// Width of the text in points, before rotation.
    pub fn text_width(&self) -> f32 {
        let units: u32 = self
            .text
            .iter()
            .map(|&byte| u32::from(advance_width(self.font, byte)))
            .sum();
        units as f32 * self.font_size / 1000.0
    }

    /// Text matrix `[a b c d e f]` that places the watermark inside
    /// `page_box`.
    ///
    /// The rotated text's bounding box is anchored at the chosen position,
    /// 36 points from the edges it touches.
    pub fn text_matrix(&self, page_box: [f32; 4]) -> [f32; 6] {
        use WatermarkPosition::*;

        let [llx, lly, urx, ury] = page_box;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let width = self.text_width();
        let height = self.font_size * CAP_HEIGHT;

        let box_width = width * cos.abs() + height * sin.abs();
        let box_height = width * sin.abs() + height * cos.abs();

        let center_x = match self.position {
            TopLeft | MiddleLeft | BottomLeft => llx + MARGIN + box_width / 2.0,
            TopCenter | Center | BottomCenter => (llx + urx) / 2.0,
            TopRight | MiddleRight | BottomRight => urx - MARGIN - box_width / 2.0,
        };
        let center_y = match self.position {
            TopLeft | TopCenter | TopRight => ury - MARGIN - box_height / 2.0,
            MiddleLeft | Center | MiddleRight => (lly + ury) / 2.0,
            BottomLeft | BottomCenter | BottomRight => lly + MARGIN + box_height / 2.0,
        };

        // Move the origin so the middle of the text lands on the center.
        let (half_w, half_h) = (width / 2.0, height / 2.0);
        [
            cos,
            sin,
            -sin,
            cos,
            center_x - (half_w * cos - half_h * sin),
            center_y - (half_w * sin + half_h * cos),
        ]
    }

    /// Draw the watermark over `pages`.
    ///
    /// The existing content of each page is wrapped in `q`/`Q` so its
    /// graphics state cannot leak into the watermark, and the watermark
    /// resources are added to a page-level copy of the inherited
    /// `Resources`.
    pub fn stamp(&self, doc: &mut Document, pages: &[ObjectId]) -> Result<()> {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let state_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => self.opacity,
            "CA" => self.opacity,
        });
        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));

        for &page_id in pages {
            let page_box = media_box(doc, page_id).unwrap_or(DEFAULT_MEDIA_BOX);
            let content = self.content(page_box).encode().map_err(|e| {
                PdfMillError::page_operation_failed(format!("Failed to encode watermark: {e}"))
            })?;
            let stamp_id = doc.add_object(Stream::new(dictionary! {}, content));

            let mut resources = inherited_resources(doc, page_id);
            add_resource(doc, &mut resources, b"Font", FONT_RESOURCE, font_id);
            add_resource(doc, &mut resources, b"ExtGState", STATE_RESOURCE, state_id);

            let page = doc.get_dictionary_mut(page_id).map_err(|e| {
                PdfMillError::page_operation_failed(format!("Failed to get page: {e}"))
            })?;

            let mut contents = vec![Object::Reference(save_id)];
            match page.get(b"Contents") {
                Ok(Object::Reference(id)) => contents.push(Object::Reference(*id)),
                Ok(Object::Array(existing)) => contents.extend(existing.iter().cloned()),
                _ => {}
            }
            contents.push(Object::Reference(stamp_id));

            page.set("Contents", contents);
            page.set("Resources", resources);
            debug!(page = ?page_id, "stamped watermark");
        }

        Ok(())
    }

    fn content(&self, page_box: [f32; 4]) -> Content {
        let [red, green, blue] = self.color;
        let matrix = self.text_matrix(page_box).map(Object::Real).to_vec();

        Content {
            operations: vec![
                Operation::new("Q", vec![]),
                Operation::new("q", vec![]),
                Operation::new("gs", vec![STATE_RESOURCE.into()]),
                Operation::new("rg", vec![red.into(), green.into(), blue.into()]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![FONT_RESOURCE.into(), self.font_size.into()]),
                Operation::new("Tm", matrix),
                Operation::new(
                    "Tj",
                    vec![Object::String(self.text.clone(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        }
    }
}

/// WinAnsi bytes for `text`. Latin-1 maps directly; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Advance width of `byte` in thousandths of the font size.
///
/// Bytes outside printable ASCII are measured as `o`.
fn advance_width(font: StandardFont, byte: u8) -> u16 {
    let widths = match font {
        StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA_WIDTHS,
        StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        StandardFont::TimesRoman => &TIMES_ROMAN_WIDTHS,
        StandardFont::Courier | StandardFont::CourierBold | StandardFont::CourierOblique => {
            return 600;
        }
    };

    let index = |b: u8| usize::from(b).wrapping_sub(32);
    widths
        .get(index(byte))
        .copied()
        .unwrap_or(widths[index(b'o')])
}

/// The `Resources` a page uses, following inheritance, as an owned copy.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dictionary(doc, resources).unwrap_or_default();
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node_id = parent,
            Err(_) => break,
        }
    }

    Dictionary::new()
}

/// Set `category/name` to `id`, copying the category dictionary first.
fn add_resource(
    doc: &Document,
    resources: &mut Dictionary,
    category: &[u8],
    name: &str,
    id: ObjectId,
) {
    let mut entries = resources
        .get(category)
        .ok()
        .and_then(|object| resolve_dictionary(doc, object))
        .unwrap_or_default();
    entries.set(name, Object::Reference(id));
    resources.set(category, entries);
}

fn resolve_dictionary(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        Object::Dictionary(dict) => Some(dict.clone()),
        _ => None,
    }
}

/// Advance widths of Helvetica and Helvetica-Oblique for bytes 32 to 126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of Helvetica-Bold for bytes 32 to 126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722,
    722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611,
    611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance widths of Times-Roman for bytes 32 to 126.
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564,
    250, 333, 250, 278, 500, 500, 500, 500, 500, 500, 500, 500,
    500, 500, 278, 278, 564, 564, 564, 444, 921, 722, 667, 667,
    722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333,
    278, 333, 469, 500, 333, 444, 500, 444, 500, 444, 333, 500,
    500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333, 389,
    278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];
