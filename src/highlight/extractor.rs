//! Document traversal: pages, annotation chains, highlight records.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::parser::{
    AnnotationChain, ErrorMode, ExtractOptions, LopdfBackend, OutlineCanvas, PdfBackend, TextLayer,
};
use crate::render::{viz_path, Overlay, RecordSink};

use super::regions::{aggregate_text, regions};
use super::HighlightRecord;

/// Outcome of one successfully processed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Records emitted for this input
    pub records: usize,
    /// Visualization copy written for this input
    pub visualization: Option<PathBuf>,
}

/// Totals over a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Inputs processed to completion
    pub documents: usize,
    pub records: usize,
    pub visualizations: Vec<PathBuf>,
    /// Inputs skipped in lenient mode, with the reason
    pub failures: Vec<(PathBuf, Error)>,
}

impl RunSummary {
    fn add(&mut self, report: FileReport) {
        self.documents += 1;
        self.records += report.records;
        self.visualizations.extend(report.visualization);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Turns highlight annotations into [`HighlightRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct HighlightExtractor {
    options: ExtractOptions,
}

impl HighlightExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Process inputs in order, streaming records into `sink`.
    ///
    /// In [`ErrorMode::Strict`] the first error ends the run. In
    /// [`ErrorMode::Lenient`] document failures are logged and collected in
    /// the summary; sink errors always end the run.
    pub fn run<P, S>(&self, inputs: &[P], sink: &mut S) -> Result<RunSummary>
    where
        P: AsRef<Path>,
        S: RecordSink + ?Sized,
    {
        self.run_with_progress(inputs, sink, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_done` after each input.
    pub fn run_with_progress<P, S, F>(
        &self,
        inputs: &[P],
        sink: &mut S,
        mut on_done: F,
    ) -> Result<RunSummary>
    where
        P: AsRef<Path>,
        S: RecordSink + ?Sized,
        F: FnMut(&Path),
    {
        let mut summary = RunSummary::default();

        for input in inputs {
            let path = input.as_ref();
            match self.extract_file(path, sink) {
                Ok(report) => summary.add(report),
                Err(e) if self.options.error_mode == ErrorMode::Lenient && e.is_document_failure() => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    summary.failures.push((path.to_path_buf(), e));
                }
                Err(e) => return Err(e),
            }
            on_done(path);
        }

        log::info!(
            "Extracted {} highlights from {} documents",
            summary.records,
            summary.documents
        );
        Ok(summary)
    }

    /// Open one PDF, emit its records and, if enabled, save its visualization.
    ///
    /// The document is released before this returns.
    pub fn extract_file<S>(&self, path: impl AsRef<Path>, sink: &mut S) -> Result<FileReport>
    where
        S: RecordSink + ?Sized,
    {
        let path = path.as_ref();
        let filename = path.display().to_string();
        let mut backend = LopdfBackend::open(path)?;

        let visualize = self.options.visualize;
        let mut overlay = Overlay::new();
        let records = self.extract_document(&filename, &backend, sink, |page, rect| {
            if visualize {
                overlay.push(page, *rect);
            }
        })?;

        let visualization = if visualize {
            let out = viz_path(path);
            self.save_visualization(&overlay, &mut backend, &out)?;
            Some(out)
        } else {
            None
        };

        Ok(FileReport {
            path: path.to_path_buf(),
            records,
            visualization,
        })
    }

    /// Draw `overlay` onto `canvas` and save it to `out`.
    pub fn save_visualization<C>(&self, overlay: &Overlay, canvas: &mut C, out: &Path) -> Result<()>
    where
        C: OutlineCanvas + ?Sized,
    {
        if overlay.is_empty() {
            log::debug!("No highlight rectangles to outline in {}", out.display());
        } else {
            log::debug!("Outlining {} rectangles into {}", overlay.len(), out.display());
        }
        overlay
            .draw_onto(canvas, &self.options.outline)
            .and_then(|()| canvas.save_as(out))
            .map_err(|e| match e {
                Error::Save { .. } => e,
                other => Error::save(out, other),
            })
    }

    /// Emit one record per highlight annotation of an open document.
    ///
    /// Every scaled region rectangle is handed to `on_rect` together with its
    /// 0-based page index; text extraction reads the same rectangle
    /// independently. Returns the number of records emitted.
    pub fn extract_document<B, S, F>(
        &self,
        filename: &str,
        backend: &B,
        sink: &mut S,
        mut on_rect: F,
    ) -> Result<usize>
    where
        B: PdfBackend + ?Sized,
        S: RecordSink + ?Sized,
        F: FnMut(u32, &Rect),
    {
        let mut emitted = 0;
        for page in 0..backend.page_count() {
            emitted += self.extract_page(filename, backend, page, sink, &mut on_rect)?;
        }
        Ok(emitted)
    }

    fn extract_page<B, S, F>(
        &self,
        filename: &str,
        backend: &B,
        page: u32,
        sink: &mut S,
        on_rect: &mut F,
    ) -> Result<usize>
    where
        B: PdfBackend + ?Sized,
        S: RecordSink + ?Sized,
        F: FnMut(u32, &Rect),
    {
        let page_num = page + 1;
        let at_page = |e: Error| Error::in_page(filename, page_num, e);

        // Parsed on the first highlight only
        let mut layer: Option<TextLayer> = None;
        let mut emitted = 0;

        for annot in AnnotationChain::new(backend, page) {
            let annot = annot.map_err(at_page)?;
            let annotation = backend.annotation(&annot).map_err(at_page)?;
            if !annotation.kind.is_highlight() {
                log::debug!(
                    "Skipping {:?} annotation {} on page {}",
                    annotation.kind,
                    annot.position,
                    page_num
                );
                continue;
            }

            let text_layer: &TextLayer = match layer {
                Some(ref l) => l,
                None => layer.insert(backend.text_layer(page).map_err(at_page)?),
            };

            let texts = regions(&annotation.vertices).map(|quad| {
                let rect = quad.rect().scale_about_center(self.options.scale);
                on_rect(page, &rect);
                text_layer.text_in_rect(&rect)
            });
            let text = aggregate_text(texts);

            log::debug!(
                "Highlight {} on page {}: {:?}",
                annot.position,
                page_num,
                text
            );
            sink.emit(&HighlightRecord::new(filename, page_num, text))?;
            emitted += 1;
        }

        Ok(emitted)
    }
}
