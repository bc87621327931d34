//! Debug visualization of highlight rectangles.
//!
//! Every scaled rectangle the extractor reads text from is recorded per page
//! and later stroked onto a copy of the document, so the area the extractor
//! sees can be compared with what the viewer renders.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::geometry::Rect;
use crate::parser::OutlineCanvas;

/// File name prefix of the visualization copy.
pub const VIZ_PREFIX: &str = "viz_";

/// Stroke appearance of drawn outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyle {
    /// Line width in points
    pub width: f64,
    /// DeviceRGB stroke colour, components in 0..=1
    pub color: [f64; 3],
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            width: 1.5,
            color: [1.0, 0.0, 0.0],
        }
    }
}

/// Rectangles to draw, grouped by 0-based page index.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pages: BTreeMap<u32, Vec<Rect>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: u32, rect: Rect) {
        self.pages.entry(page).or_default().push(rect);
    }

    /// Total number of recorded rectangles.
    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Stroke every recorded rectangle onto its page.
    pub fn draw_onto<C: OutlineCanvas + ?Sized>(
        &self,
        canvas: &mut C,
        style: &OutlineStyle,
    ) -> Result<()> {
        for (&page, rects) in &self.pages {
            for rect in rects {
                canvas.draw_outline(page, rect, style)?;
            }
        }
        Ok(())
    }
}

/// Path of the visualization copy: same directory, file name prefixed.
pub fn viz_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{VIZ_PREFIX}{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingCanvas {
        drawn: Vec<(u32, Rect)>,
    }

    impl OutlineCanvas for RecordingCanvas {
        fn draw_outline(&mut self, page: u32, rect: &Rect, _style: &OutlineStyle) -> Result<()> {
            self.drawn.push((page, *rect));
            Ok(())
        }

        fn save_as(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_viz_path_prefixes_file_name_only() {
        assert_eq!(
            viz_path(Path::new("papers/alice.pdf")),
            PathBuf::from("papers/viz_alice.pdf")
        );
        assert_eq!(viz_path(Path::new("alice.pdf")), PathBuf::from("viz_alice.pdf"));
        assert_eq!(
            viz_path(Path::new("/tmp/viz/a b.pdf")),
            PathBuf::from("/tmp/viz/viz_a b.pdf")
        );
    }

    #[test]
    fn test_overlay_draws_by_page() {
        let mut overlay = Overlay::new();
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 20.0, 20.0);
        overlay.push(2, b);
        overlay.push(0, a);
        overlay.push(2, a);
        assert_eq!(overlay.len(), 3);
        assert!(!overlay.is_empty());

        let mut canvas = RecordingCanvas::default();
        overlay.draw_onto(&mut canvas, &OutlineStyle::default()).unwrap();
        assert_eq!(canvas.drawn, vec![(0, a), (2, b), (2, a)]);
    }

    #[test]
    fn test_default_style_is_red() {
        let style = OutlineStyle::default();
        assert_eq!(style.width, 1.5);
        assert_eq!(style.color, [1.0, 0.0, 0.0]);
    }
}
