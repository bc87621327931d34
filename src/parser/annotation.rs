//! Annotation model and the page annotation chain.

use crate::error::Result;
use crate::geometry::Point;

use super::backend::PdfBackend;

/// Annotation type, from the PDF `/Subtype` name.
///
/// Unknown subtypes land in [`AnnotationKind::Other`], so classification never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Highlight,
    Underline,
    StrikeOut,
    Squiggly,
    Text,
    FreeText,
    Link,
    Popup,
    Ink,
    Other(String),
}

impl AnnotationKind {
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "Highlight" => AnnotationKind::Highlight,
            "Underline" => AnnotationKind::Underline,
            "StrikeOut" => AnnotationKind::StrikeOut,
            "Squiggly" => AnnotationKind::Squiggly,
            "Text" => AnnotationKind::Text,
            "FreeText" => AnnotationKind::FreeText,
            "Link" => AnnotationKind::Link,
            "Popup" => AnnotationKind::Popup,
            "Ink" => AnnotationKind::Ink,
            other => AnnotationKind::Other(other.to_string()),
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self, AnnotationKind::Highlight)
    }
}

/// Handle to one annotation in a page's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationRef {
    /// 0-based page index
    pub page: u32,
    /// Position in the page's annotation chain
    pub position: usize,
}

impl AnnotationRef {
    pub fn new(page: u32, position: usize) -> Self {
        Self { page, position }
    }
}

/// A resolved annotation: its type and quad vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Flat vertex list, grouped in runs of four per highlighted region
    pub vertices: Vec<Point>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, vertices: Vec<Point>) -> Self {
        Self { kind, vertices }
    }

    /// Pair a flat `/QuadPoints` coordinate list into vertices.
    ///
    /// A trailing unpaired coordinate is dropped.
    pub fn from_quad_points(kind: AnnotationKind, coords: &[f64]) -> Self {
        let vertices = coords
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect();
        Self { kind, vertices }
    }
}

/// Forward-only walk over a page's annotations.
///
/// Starts at the backend's first annotation and follows successor links until
/// there is none. After yielding an error the chain is finished.
pub struct AnnotationChain<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    state: ChainState,
}

enum ChainState {
    Start(u32),
    At(AnnotationRef),
    Done,
}

impl<'a, B: PdfBackend + ?Sized> AnnotationChain<'a, B> {
    pub fn new(backend: &'a B, page: u32) -> Self {
        Self {
            backend,
            state: ChainState::Start(page),
        }
    }
}

impl<B: PdfBackend + ?Sized> Iterator for AnnotationChain<'_, B> {
    type Item = Result<AnnotationRef>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match std::mem::replace(&mut self.state, ChainState::Done) {
            ChainState::Start(page) => self.backend.first_annotation(page),
            ChainState::At(current) => self.backend.next_annotation(&current),
            ChainState::Done => return None,
        };

        match step {
            Ok(Some(annot)) => {
                self.state = ChainState::At(annot);
                Some(Ok(annot))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
