//! Grouping of highlight vertices into regions, and region text aggregation.

use std::iter::FusedIterator;
use std::slice::ChunksExact;

use crate::geometry::{Point, Quad};

/// Vertices per highlighted region.
pub const VERTICES_PER_REGION: usize = 4;

/// Lazily yields one [`Quad`] per complete run of four vertices.
///
/// Trailing vertices that do not fill a run are never yielded.
#[derive(Debug, Clone)]
pub struct Regions<'a> {
    chunks: ChunksExact<'a, Point>,
}

/// Split a flat vertex list into quadrilateral regions, in order.
pub fn regions(vertices: &[Point]) -> Regions<'_> {
    let chunks = vertices.chunks_exact(VERTICES_PER_REGION);
    if !chunks.remainder().is_empty() {
        log::debug!(
            "Ignoring {} trailing highlight vertices",
            chunks.remainder().len()
        );
    }
    Regions { chunks }
}

impl Iterator for Regions<'_> {
    type Item = Quad;

    fn next(&mut self) -> Option<Quad> {
        self.chunks
            .next()
            .map(|c| Quad::new([c[0], c[1], c[2], c[3]]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Regions<'_> {}

impl FusedIterator for Regions<'_> {}

/// Join per-region texts into one string.
///
/// Each text is trimmed; texts that are empty after trimming are dropped and
/// the rest are joined with single spaces in region order.
pub fn aggregate_text<I, S>(texts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for text in texts {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}
