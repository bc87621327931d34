//! Extraction options and configuration.

use crate::geometry::ScaleFactors;
use crate::render::OutlineStyle;

/// Options for extracting highlights.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Factors applied to each highlight rectangle about its center
    pub scale: ScaleFactors,

    /// Whether to write a `viz_` copy of each input with the rectangles drawn
    pub visualize: bool,

    /// Error handling mode across input documents
    pub error_mode: ErrorMode,

    /// Outline appearance for visualization
    pub outline: OutlineStyle,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rectangle scale factors.
    pub fn with_scale(mut self, scale: ScaleFactors) -> Self {
        self.scale = scale;
        self
    }

    /// Enable or disable visualization output.
    pub fn with_visualize(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip inputs that fail and continue).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the outline style used for visualization.
    pub fn with_outline(mut self, outline: OutlineStyle) -> Self {
        self.outline = outline;
        self
    }
}

/// Error handling mode across input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop at the first error
    #[default]
    Strict,
    /// Log the failure, record it in the run summary and move on
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_scale(ScaleFactors::new(1.0, 0.76).unwrap())
            .with_visualize(true)
            .lenient();

        assert_eq!(options.scale.height, 0.76);
        assert!(options.visualize);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.scale.is_identity());
        assert!(!options.visualize);
        assert_eq!(options.outline, OutlineStyle::default());
    }
}
