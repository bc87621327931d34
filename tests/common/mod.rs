//! Synthetic PDF fixtures shared by the integration tests.
//!
//! Pages carry one line of 12pt Helvetica per text entry. Without `/Widths`
//! every glyph advances 6pt, so "Hello World" at x=100 occupies 100..166 and
//! the glyph centres sit at 103, 109, ... on a box spanning baseline-2.4 to
//! baseline+9.6. Pages can instead use a simple font with `/Widths` or a
//! Type0 font with two-byte codes, and can store their content Flate
//! compressed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// The `/F1` font of a page.
#[derive(Default, Clone)]
pub enum FontSpec {
    /// Standard 14 Helvetica without `/Widths`
    #[default]
    Helvetica,
    /// Simple font with `/FirstChar` and `/Widths`
    Widths { first_char: i64, widths: Vec<i64> },
    /// Type0 font over Identity-H with a CIDFontType2 descendant
    Cid { default_width: i64, widths: Vec<(u16, i64)> },
}

impl FontSpec {
    /// Every printable ASCII character a quarter em wide.
    pub fn quarter_em() -> Self {
        FontSpec::Widths {
            first_char: 32,
            widths: vec![250; 95],
        }
    }

    fn dictionary(&self) -> Dictionary {
        match self {
            FontSpec::Helvetica => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
            FontSpec::Widths { first_char, widths } => dictionary! {
                "Type" => "Font",
                "Subtype" => "TrueType",
                "BaseFont" => "TestSerif",
                "FirstChar" => *first_char,
                "LastChar" => *first_char + widths.len() as i64 - 1,
                "Widths" => widths.iter().map(|&w| Object::from(w)).collect::<Vec<_>>(),
            },
            FontSpec::Cid {
                default_width,
                widths,
            } => {
                let w: Vec<Object> = widths
                    .iter()
                    .flat_map(|&(cid, width)| {
                        [Object::from(i64::from(cid)), vec![Object::from(width)].into()]
                    })
                    .collect();
                dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type0",
                    "BaseFont" => "TestSans",
                    "Encoding" => "Identity-H",
                    "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                        "Type" => "Font",
                        "Subtype" => "CIDFontType2",
                        "BaseFont" => "TestSans",
                        "DW" => *default_width,
                        "W" => w,
                    })],
                }
            }
        }
    }

    /// String operand showing `text` in this font.
    fn show_operand(&self, text: &str) -> String {
        match self {
            FontSpec::Cid { .. } => {
                let hex: String = text.chars().map(|c| format!("{:04X}", c as u32)).collect();
                format!("<{hex}>")
            }
            _ => format!("({text})"),
        }
    }
}

/// One page: text lines and annotation dictionaries.
#[derive(Default)]
pub struct PageSpec {
    pub lines: Vec<(String, f64, f64)>,
    pub annots: Vec<Dictionary>,
    /// Leave out `/Contents` entirely
    pub no_content: bool,
    pub font: FontSpec,
    /// Store the content stream with `/FlateDecode`
    pub compressed: bool,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str, x: f64, baseline: f64) -> Self {
        self.lines.push((text.to_string(), x, baseline));
        self
    }

    pub fn annot(mut self, annot: Dictionary) -> Self {
        self.annots.push(annot);
        self
    }

    pub fn without_content(mut self) -> Self {
        self.no_content = true;
        self
    }

    pub fn font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Flate-compress the content stream, padded with no-op `q Q` pairs so
    /// compression always pays off.
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }
}

/// A `/Highlight` covering each `[x0, y0, x1, y1]` rectangle, in order.
pub fn highlight(rects: &[[f64; 4]]) -> Dictionary {
    let coords: Vec<f64> = rects
        .iter()
        .flat_map(|&[x0, y0, x1, y1]| [x0, y1, x1, y1, x0, y0, x1, y0])
        .collect();
    highlight_with_coords(&coords)
}

/// A `/Highlight` with a raw `/QuadPoints` coordinate list.
pub fn highlight_with_coords(coords: &[f64]) -> Dictionary {
    let quad_points: Vec<Object> = coords.iter().map(|&v| Object::Real(v as f32)).collect();
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "QuadPoints" => quad_points,
    }
}

/// A sticky note that covers the whole page.
pub fn note() -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "QuadPoints" => vec![
            0.into(), 792.into(), 612.into(), 792.into(),
            0.into(), 0.into(), 612.into(), 0.into(),
        ],
    }
}

pub fn build_pdf(pages: Vec<PageSpec>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let font_id = doc.add_object(page.font.dictionary());
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
        };

        if !page.no_content {
            let mut content: String = page
                .lines
                .iter()
                .map(|(text, x, y)| {
                    let operand = page.font.show_operand(text);
                    format!("BT /F1 12 Tf {x} {y} Td {operand} Tj ET\n")
                })
                .collect();
            let stream = if page.compressed {
                content.push_str(&"q Q\n".repeat(64));
                let mut stream = Stream::new(Dictionary::new(), content.into_bytes());
                stream.compress().expect("failed to compress test content");
                stream
            } else {
                Stream::new(Dictionary::new(), content.into_bytes())
            };
            let content_id = doc.add_object(stream);
            page_dict.set("Contents", content_id);
        }

        if !page.annots.is_empty() {
            let annots: Vec<Object> = page
                .annots
                .into_iter()
                .map(|a| doc.add_object(a).into())
                .collect();
            page_dict.set("Annots", annots);
        }

        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn pdf_bytes(pages: Vec<PageSpec>) -> Vec<u8> {
    let mut buf = Vec::new();
    build_pdf(pages)
        .save_to(&mut buf)
        .expect("failed to save test PDF");
    buf
}

pub fn write_pdf(dir: &Path, name: &str, pages: Vec<PageSpec>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages)).expect("failed to write test PDF");
    path
}

/// Rectangle around the "Hello" glyphs of "Hello World" at (100, 700).
pub const HELLO: [f64; 4] = [99.0, 698.0, 131.0, 712.0];
/// Rectangle around the "World" glyphs of "Hello World" at (100, 700).
pub const WORLD: [f64; 4] = [135.0, 698.0, 167.0, 712.0];
