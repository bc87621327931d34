//! PDF backend abstraction layer.
//!
//! The highlight pipeline talks to PDF documents only through the
//! [`PdfBackend`] and [`OutlineCanvas`] traits, isolating the concrete PDF
//! library (lopdf) from the extraction logic.

use std::collections::HashSet;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::render::OutlineStyle;

use super::annotation::{Annotation, AnnotationKind, AnnotationRef};
use super::layout::{get_number, resolve, LayoutAnalyzer, TextLayer};

/// Read access to pages, annotations and page text.
///
/// Pages are addressed by 0-based index.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// First annotation of a page's chain, if any.
    fn first_annotation(&self, page: u32) -> Result<Option<AnnotationRef>>;

    /// Successor of an annotation in its page's chain, if any.
    fn next_annotation(&self, current: &AnnotationRef) -> Result<Option<AnnotationRef>>;

    /// Resolve an annotation's type and vertices.
    fn annotation(&self, annot: &AnnotationRef) -> Result<Annotation>;

    /// Positioned text of a page.
    fn text_layer(&self, page: u32) -> Result<TextLayer>;
}

/// Write access used for visualization output.
pub trait OutlineCanvas {
    /// Stroke a rectangle outline onto a page.
    fn draw_outline(&mut self, page: u32, rect: &Rect, style: &OutlineStyle) -> Result<()>;

    /// Persist the document, including drawn outlines, to `path`.
    fn save_as(&mut self, path: &Path) -> Result<()>;
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
    /// Pages whose original content has already been wrapped in `q ... Q`
    isolated: HashSet<ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    ///
    /// Every failure is reported as [`Error::Open`] carrying the path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::load_file(path).map_err(|e| Error::open(path, e))
    }

    fn load_file(path: &Path) -> Result<Self> {
        detect_format_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        log::info!("Opened {} (PDF {})", path.display(), doc.version);
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            isolated: HashSet::new(),
        }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        // Reported 1-based, like record page numbers
        self.pages
            .get(page as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(page + 1, self.page_count()))
    }

    /// The page's `/Annots` entries, resolved through one level of indirection.
    fn annots(&self, page: u32) -> Result<&[Object]> {
        let page_dict = self.doc.get_dictionary(self.page_id(page)?)?;
        let Ok(annots) = page_dict.get(b"Annots") else {
            return Ok(&[]);
        };
        resolve(&self.doc, annots)
            .as_array()
            .map(Vec::as_slice)
            .map_err(|e| Error::PdfParse(format!("/Annots is not an array: {e}")))
    }

    fn annot_dict(&self, annot: &AnnotationRef) -> Result<Option<&Dictionary>> {
        let entry = self.annots(annot.page)?.get(annot.position).ok_or_else(|| {
            Error::PdfParse(format!("annotation {} does not exist", annot.position))
        })?;
        match resolve(&self.doc, entry).as_dict() {
            Ok(dict) => Ok(Some(dict)),
            Err(_) => {
                log::warn!(
                    "Skipping non-dictionary annotation {} on page {}",
                    annot.position,
                    annot.page + 1
                );
                Ok(None)
            }
        }
    }

    /// Wrap the page's existing content in `q ... Q` once, then append `stream`.
    fn append_content(&mut self, page_id: ObjectId, stream: Stream) -> Result<()> {
        let mut contents: Vec<Object> = {
            let page_dict = self.doc.get_dictionary(page_id)?;
            match page_dict.get(b"Contents") {
                Ok(obj @ Object::Reference(_)) => match resolve(&self.doc, obj) {
                    Object::Array(arr) => arr.clone(),
                    _ => vec![obj.clone()],
                },
                Ok(Object::Array(arr)) => arr.clone(),
                _ => Vec::new(),
            }
        };

        if self.isolated.insert(page_id) && !contents.is_empty() {
            let save = self.add_stream(vec![Operation::new("q", vec![])])?;
            let restore = self.add_stream(vec![Operation::new("Q", vec![])])?;
            contents.insert(0, save.into());
            contents.push(restore.into());
        }

        contents.push(self.doc.add_object(stream).into());
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn add_stream(&mut self, operations: Vec<Operation>) -> Result<ObjectId> {
        let stream = content_stream(operations)?;
        Ok(self.doc.add_object(stream))
    }
}

fn content_stream(operations: Vec<Operation>) -> Result<Stream> {
    let bytes = Content { operations }
        .encode()
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    Ok(Stream::new(Dictionary::new(), bytes))
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn first_annotation(&self, page: u32) -> Result<Option<AnnotationRef>> {
        let annots = self.annots(page)?;
        Ok((!annots.is_empty()).then(|| AnnotationRef::new(page, 0)))
    }

    fn next_annotation(&self, current: &AnnotationRef) -> Result<Option<AnnotationRef>> {
        let next = current.position + 1;
        let annots = self.annots(current.page)?;
        Ok((next < annots.len()).then(|| AnnotationRef::new(current.page, next)))
    }

    fn annotation(&self, annot: &AnnotationRef) -> Result<Annotation> {
        let Some(dict) = self.annot_dict(annot)? else {
            return Ok(Annotation::new(
                AnnotationKind::Other(String::new()),
                Vec::new(),
            ));
        };

        let kind = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| resolve(&self.doc, o).as_name().ok())
            .map(|n| AnnotationKind::from_subtype(&String::from_utf8_lossy(n)))
            .unwrap_or_else(|| AnnotationKind::Other(String::new()));

        if !kind.is_highlight() {
            return Ok(Annotation::new(kind, Vec::new()));
        }

        let coords = match dict.get(b"QuadPoints") {
            Ok(obj) => match resolve(&self.doc, obj).as_array() {
                Ok(arr) => arr
                    .iter()
                    .map(|o| {
                        get_number(resolve(&self.doc, o)).ok_or_else(|| {
                            Error::PdfParse(format!("non-numeric /QuadPoints entry: {o:?}"))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?,
                Err(_) => {
                    log::warn!(
                        "Highlight {} on page {} has a non-array /QuadPoints",
                        annot.position,
                        annot.page + 1
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Ok(Annotation::from_quad_points(kind, &coords))
    }

    fn text_layer(&self, page: u32) -> Result<TextLayer> {
        LayoutAnalyzer::new(&self.doc).page_text_layer(self.page_id(page)?)
    }
}

impl OutlineCanvas for LopdfBackend {
    fn draw_outline(&mut self, page: u32, rect: &Rect, style: &OutlineStyle) -> Result<()> {
        let page_id = self.page_id(page)?;
        let [r, g, b] = style.color;
        let real = |v: f64| Object::Real(v as f32);

        let stream = content_stream(vec![
            Operation::new("q", vec![]),
            Operation::new("RG", vec![real(r), real(g), real(b)]),
            Operation::new("w", vec![real(style.width)]),
            Operation::new(
                "re",
                vec![real(rect.x0), real(rect.y0), real(rect.width()), real(rect.height())],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ])?;

        self.append_content(page_id, stream)
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.doc
            .save(path)
            .map_err(|e| Error::save(path, e.into()))?;
        log::info!("Saved visualization to {}", path.display());
        Ok(())
    }
}
