//! Positioned text for textbox extraction.
//!
//! A page content stream is interpreted into individual glyphs placed in
//! default user space, the same space annotation quad points live in. Text
//! inside an arbitrary rectangle can then be reassembled line by line.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object, ObjectId};

use crate::error::{Error, Result};
use crate::geometry::{Matrix, Point, Rect};

/// Glyph advance used when the font carries no usable widths, in text space
/// units (half an em).
const FALLBACK_ADVANCE: f64 = 0.5;

/// Descender depth and ascender height as fractions of the font size.
const DESCENT: f64 = 0.2;
const ASCENT: f64 = 0.8;

/// A single rendered character with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    /// Baseline origin in user space
    pub origin: Point,
    /// Bounding box in user space
    pub bbox: Rect,
    /// Effective font size in user space
    pub size: f64,
}

impl Glyph {
    /// Build an unrotated glyph from its baseline origin, advance width and size.
    pub fn new(ch: char, x: f64, baseline: f64, width: f64, size: f64) -> Self {
        Self {
            ch,
            origin: Point::new(x, baseline),
            bbox: Rect::new(x, baseline - size * DESCENT, x + width, baseline + size * ASCENT),
            size,
        }
    }

    fn is_blank(&self) -> bool {
        self.ch.is_whitespace() || self.ch == '\u{00A0}'
    }
}

/// All glyphs of one page, in content stream order.
#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    glyphs: Vec<Glyph>,
}

impl TextLayer {
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs }
    }

    /// Lay out a string left to right with a uniform advance, for tests and
    /// synthetic pages.
    pub fn push_str(&mut self, text: &str, x: f64, baseline: f64, size: f64) {
        let advance = size * FALLBACK_ADVANCE;
        for (i, ch) in text.chars().enumerate() {
            self.glyphs
                .push(Glyph::new(ch, x + advance * i as f64, baseline, advance, size));
        }
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Text of every glyph whose box centre lies inside `rect`.
    ///
    /// Lines are ordered top to bottom and joined with `\n`; glyphs within a
    /// line are ordered left to right. The result is not trimmed.
    pub fn text_in_rect(&self, rect: &Rect) -> String {
        let mut selected: Vec<&Glyph> = self
            .glyphs
            .iter()
            .filter(|g| rect.contains_point(g.bbox.center()))
            .collect();

        if selected.is_empty() {
            return String::new();
        }

        // PDF Y grows upwards, so top-to-bottom is descending baseline
        selected.sort_by(|a, b| {
            b.origin
                .y
                .partial_cmp(&a.origin.y)
                .unwrap_or(Ordering::Equal)
                .then(a.origin.x.partial_cmp(&b.origin.x).unwrap_or(Ordering::Equal))
        });

        let mut lines: Vec<Vec<&Glyph>> = Vec::new();
        let mut line_y: Option<f64> = None;
        for glyph in selected {
            let tolerance = glyph.size * 0.3;
            match line_y {
                Some(y) if (glyph.origin.y - y).abs() <= tolerance => {
                    if let Some(line) = lines.last_mut() {
                        line.push(glyph);
                    }
                }
                _ => {
                    line_y = Some(glyph.origin.y);
                    lines.push(vec![glyph]);
                }
            }
        }

        lines
            .into_iter()
            .map(|mut line| {
                line.sort_by(|a, b| a.origin.x.partial_cmp(&b.origin.x).unwrap_or(Ordering::Equal));
                line_text(&line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Join the glyphs of one line, inserting a space across visible gaps.
fn line_text(line: &[&Glyph]) -> String {
    let mut result = String::new();
    let mut prev: Option<&Glyph> = None;

    for glyph in line {
        if let Some(p) = prev {
            let gap = glyph.bbox.x0 - p.bbox.x1;
            let avg_width = if glyph.bbox.width() > 0.0 {
                glyph.bbox.width()
            } else {
                glyph.size * FALLBACK_ADVANCE
            };
            let spaceless = is_spaceless_script_char(p.ch) && is_spaceless_script_char(glyph.ch);
            if gap > avg_width * 0.2 && !spaceless && !p.is_blank() && !glyph.is_blank() {
                result.push(' ');
            }
        }
        result.push(glyph.ch);
        prev = Some(glyph);
    }

    result
}

/// Graphics and text state saved by `q` / restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
    font_name: Vec<u8>,
    font_size: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font_name: Vec::new(),
            font_size: 12.0,
        }
    }
}

/// Text and line matrices, reset by `BT`.
#[derive(Debug, Clone, Default)]
struct TextCursor {
    tm: Matrix,
    tlm: Matrix,
}

impl TextCursor {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).concat(&self.tlm);
        self.tm = self.tlm;
    }

    fn set(&mut self, m: Matrix) {
        self.tlm = m;
        self.tm = m;
    }

    fn advance(&mut self, tx: f64) {
        self.tm = Matrix::translate(tx, 0.0).concat(&self.tm);
    }
}

/// Simple-font advance widths from `/FirstChar` and `/Widths`.
struct FontWidths {
    first_char: i64,
    widths: Vec<f64>,
}

impl FontWidths {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Option<Self> {
        let first_char = font.get(b"FirstChar").ok().and_then(|o| o.as_i64().ok())?;
        let widths = resolve(doc, font.get(b"Widths").ok()?).as_array().ok()?;
        Some(Self {
            first_char,
            widths: widths
                .iter()
                .map(|w| get_number(resolve(doc, w)).unwrap_or(0.0))
                .collect(),
        })
    }

    /// Width of a one-byte code in text space units.
    fn advance(&self, code: u8) -> Option<f64> {
        let index = usize::try_from(i64::from(code) - self.first_char).ok()?;
        self.widths.get(index).map(|w| w / 1000.0)
    }
}

/// Composite-font advance widths from the descendant's `/DW` and `/W`.
#[derive(Debug, PartialEq)]
struct CidWidths {
    default: f64,
    /// Inclusive CID ranges and their width, in `/W` order
    ranges: Vec<(u32, u32, f64)>,
}

impl CidWidths {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Option<Self> {
        let descendants = resolve(doc, font.get(b"DescendantFonts").ok()?).as_array().ok()?;
        let cid_font = resolve(doc, descendants.first()?).as_dict().ok()?;

        let default = cid_font
            .get(b"DW")
            .ok()
            .and_then(|o| get_number(resolve(doc, o)))
            .unwrap_or(1000.0);

        let mut ranges = Vec::new();
        if let Some(w) = cid_font
            .get(b"W")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
        {
            parse_cid_widths(doc, w, &mut ranges);
        }

        Some(Self { default, ranges })
    }

    /// Width of a CID in text space units.
    fn advance(&self, cid: u32) -> f64 {
        self.ranges
            .iter()
            .find(|(first, last, _)| (*first..=*last).contains(&cid))
            .map_or(self.default, |&(_, _, w)| w)
            / 1000.0
    }
}

/// Read a `/W` array: `c [w1 w2 ...]` entries and `c_first c_last w` entries.
fn parse_cid_widths(doc: &LopdfDocument, w: &[Object], ranges: &mut Vec<(u32, u32, f64)>) {
    let cid = |o: &Object| get_number(resolve(doc, o)).map(|n| n.max(0.0) as u32);

    let mut i = 0;
    while let Some(first) = w.get(i).and_then(cid) {
        match w.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, width) in (0u32..).zip(list) {
                    if let Some(width) = get_number(resolve(doc, width)) {
                        ranges.push((first + offset, first + offset, width));
                    }
                }
                i += 2;
            }
            Some(last) => {
                let Some(last) = cid(last) else { break };
                let Some(width) = w.get(i + 2).and_then(|o| get_number(resolve(doc, o))) else {
                    break;
                };
                ranges.push((first, last, width));
                i += 3;
            }
            None => break,
        }
    }
    if i < w.len() {
        log::debug!("Ignoring malformed /W entries from index {}", i);
    }
}

enum FontMetrics {
    Simple(FontWidths),
    Cid(CidWidths),
    Unknown,
}

/// Decoding and metrics of one font resource, loaded once per page.
struct PageFont<'d> {
    encoding: Option<Encoding<'d>>,
    /// Bytes per character code: 2 for Type0 fonts, 1 otherwise
    code_len: usize,
    metrics: FontMetrics,
}

impl<'d> PageFont<'d> {
    fn load(doc: &'d LopdfDocument, font: &'d Dictionary) -> Self {
        let composite = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|name| name == b"Type0")
            .unwrap_or(false);

        // One-byte tables cannot decode two-byte codes and vice versa
        let encoding = font.get_font_encoding(doc).ok().filter(|enc| match enc {
            Encoding::OneByteEncoding(_) => !composite,
            Encoding::UnicodeMapEncoding(_) => composite,
            Encoding::SimpleEncoding(_) => true,
        });

        let metrics = if composite {
            CidWidths::from_font(doc, font).map(FontMetrics::Cid)
        } else {
            FontWidths::from_font(doc, font).map(FontMetrics::Simple)
        };

        Self {
            encoding,
            code_len: if composite { 2 } else { 1 },
            metrics: metrics.unwrap_or(FontMetrics::Unknown),
        }
    }

    fn decode(&self, code: &[u8]) -> String {
        if let Some(text) = self
            .encoding
            .as_ref()
            .and_then(|enc| LopdfDocument::decode_text(enc, code).ok())
        {
            return text;
        }
        if self.code_len == 1 {
            return decode_text_simple(code);
        }
        // Identity ordering without a ToUnicode map: the CID is the code point
        char::from_u32(code_value(code))
            .map(String::from)
            .unwrap_or_default()
    }

    fn advance(&self, code: &[u8]) -> Option<f64> {
        match &self.metrics {
            FontMetrics::Simple(widths) => code.first().and_then(|&b| widths.advance(b)),
            FontMetrics::Cid(widths) => Some(widths.advance(code_value(code))),
            FontMetrics::Unknown => None,
        }
    }
}

/// Big-endian value of a character code.
fn code_value(code: &[u8]) -> u32 {
    code.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

/// Builds [`TextLayer`]s from page content streams.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Interpret the page's content stream into glyphs.
    pub fn page_text_layer(&self, page_id: ObjectId) -> Result<TextLayer> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Some(content) = self.page_content(page_id)? else {
            return Ok(TextLayer::default());
        };

        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut page_fonts: BTreeMap<Vec<u8>, Option<PageFont<'a>>> = BTreeMap::new();
        let mut glyphs = Vec::new();
        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut cursor = TextCursor::default();

        for op in content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(get_number);

            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(operands) {
                        state.ctm = m.concat(&state.ctm);
                    }
                }
                "BT" => cursor = TextCursor::default(),
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        state.font_name = name.clone();
                    }
                    state.font_size = num(1).unwrap_or(state.font_size);
                }
                "Tc" => state.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => state.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => state.horizontal_scale = num(0).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = num(0).unwrap_or(0.0),
                "Ts" => state.rise = num(0).unwrap_or(0.0),
                "Td" => cursor.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = num(1).unwrap_or(0.0);
                    state.leading = -ty;
                    cursor.move_line(num(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(operands) {
                        cursor.set(m);
                    }
                }
                "T*" => cursor.move_line(0.0, -state.leading),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let font = self.font(&mut page_fonts, &fonts, &state.font_name);
                        show(bytes, &state, &mut cursor, font, &mut glyphs);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let font = self.font(&mut page_fonts, &fonts, &state.font_name);
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    show(bytes, &state, &mut cursor, font, &mut glyphs)
                                }
                                other => {
                                    if let Some(adjust) = get_number(other) {
                                        cursor.advance(
                                            -adjust / 1000.0
                                                * state.font_size
                                                * state.horizontal_scale,
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
                "'" => {
                    cursor.move_line(0.0, -state.leading);
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let font = self.font(&mut page_fonts, &fonts, &state.font_name);
                        show(bytes, &state, &mut cursor, font, &mut glyphs);
                    }
                }
                "\"" => {
                    state.word_spacing = num(0).unwrap_or(state.word_spacing);
                    state.char_spacing = num(1).unwrap_or(state.char_spacing);
                    cursor.move_line(0.0, -state.leading);
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        let font = self.font(&mut page_fonts, &fonts, &state.font_name);
                        show(bytes, &state, &mut cursor, font, &mut glyphs);
                    }
                }
                "Do" => log::debug!("Skipping XObject on page {:?}", page_id),
                _ => {}
            }
        }

        Ok(TextLayer::from_glyphs(glyphs))
    }

    /// The page font named `name`, loading it on first use.
    fn font<'c>(
        &self,
        page_fonts: &'c mut BTreeMap<Vec<u8>, Option<PageFont<'a>>>,
        fonts: &BTreeMap<Vec<u8>, &'a Dictionary>,
        name: &[u8],
    ) -> Option<&'c PageFont<'a>> {
        page_fonts
            .entry(name.to_vec())
            .or_insert_with(|| fonts.get(name).map(|&font| PageFont::load(self.doc, font)))
            .as_ref()
    }

    /// Content stream bytes with any filters removed, or `None` for a page
    /// without one.
    fn page_content(&self, page_id: ObjectId) -> Result<Option<Vec<u8>>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(None);
        };

        match resolve(self.doc, contents) {
            Object::Stream(s) => s
                .get_plain_content()
                .map(Some)
                .map_err(|e| Error::PdfParse(e.to_string())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = resolve(self.doc, obj) {
                        match s.get_plain_content() {
                            Ok(data) => {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                            Err(e) => log::warn!("Skipping undecodable content stream: {}", e),
                        }
                    }
                }
                Ok(Some(content))
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }
}

/// Place the glyphs of one shown string and advance the text matrix.
///
/// Without a font resource the string is decoded as a whole and every
/// character gets the fallback advance.
fn show(
    bytes: &[u8],
    state: &GraphicsState,
    cursor: &mut TextCursor,
    font: Option<&PageFont>,
    glyphs: &mut Vec<Glyph>,
) {
    let Some(font) = font else {
        for ch in decode_text_simple(bytes).chars() {
            place(&ch.to_string(), FALLBACK_ADVANCE, ch == ' ', state, cursor, glyphs);
        }
        return;
    };

    for code in bytes.chunks_exact(font.code_len) {
        let width = font.advance(code).unwrap_or(FALLBACK_ADVANCE);
        // Word spacing applies to the single-byte code 32 only
        place(&font.decode(code), width, code == b" ", state, cursor, glyphs);
    }
}

/// Emit the characters of one code within its advance, then move past it.
fn place(
    text: &str,
    width: f64,
    word_space: bool,
    state: &GraphicsState,
    cursor: &mut TextCursor,
    glyphs: &mut Vec<Glyph>,
) {
    let fs = state.font_size;
    let th = state.horizontal_scale;
    let trm = Matrix::new(fs * th, 0.0, 0.0, fs, 0.0, state.rise)
        .concat(&cursor.tm)
        .concat(&state.ctm);
    let (vx, vy) = trm.transform_vector(0.0, 1.0);

    // Ligatures decode to several characters sharing one advance
    let count = text.chars().count();
    let part = if count > 0 { width / count as f64 } else { width };
    for (i, ch) in text.chars().enumerate() {
        let x = part * i as f64;
        glyphs.push(Glyph {
            ch,
            origin: trm.transform_point(Point::new(x, 0.0)),
            bbox: Rect::new(x, -DESCENT, x + part, ASCENT).transform(&trm),
            size: vx.hypot(vy),
        });
    }

    let spacing = if word_space {
        state.char_spacing + state.word_spacing
    } else {
        state.char_spacing
    };
    cursor.advance((width * fs + spacing) * th);
}

/// Follow an indirect reference, if any.
pub(crate) fn resolve<'d>(doc: &'d LopdfDocument, obj: &'d Object) -> &'d Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    let v: Vec<f64> = operands.iter().take(6).filter_map(get_number).collect();
    match v[..] {
        [a, b, c, d, e, f] => Some(Matrix::new(a, b, c, d, e, f)),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Fallback decoding when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
