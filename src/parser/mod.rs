//! PDF access: backends, annotations and positioned text.

mod annotation;
mod backend;
mod layout;
mod options;

pub use annotation::{Annotation, AnnotationChain, AnnotationKind, AnnotationRef};
pub use backend::{LopdfBackend, OutlineCanvas, PdfBackend};
pub use layout::{Glyph, LayoutAnalyzer, TextLayer};
pub use options::{ErrorMode, ExtractOptions};
