//! Benchmarks for highlight extraction.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic: every page holds a block of 12pt text lines and
//! a handful of highlights over them.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use pdf_highlights::parser::TextLayer;
use pdf_highlights::{extract_highlights_from_bytes, ExtractOptions, Rect, ScaleFactors};

const LINES_PER_PAGE: usize = 40;
const LINE: &str = "The quick brown fox jumps over the lazy dog near the river bank.";

fn line_baseline(i: usize) -> f64 {
    750.0 - 16.0 * i as f64
}

/// Highlight covering the first `chars` glyphs of line `i`.
fn highlight(i: usize, chars: usize) -> Dictionary {
    let y = line_baseline(i);
    let (x0, x1, y0, y1) = (50.0, 50.0 + 6.0 * chars as f64, y - 3.0, y + 11.0);
    let quad_points: Vec<Object> = [x0, y1, x1, y1, x0, y0, x1, y0]
        .iter()
        .map(|&v| Object::Real(v as f32))
        .collect();
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "QuadPoints" => quad_points,
    }
}

fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let content: String = (0..LINES_PER_PAGE)
            .map(|i| format!("BT /F1 12 Tf 50 {} Td ({LINE}) Tj ET\n", line_baseline(i)))
            .collect();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let annots: Vec<Object> = (0..LINES_PER_PAGE)
            .step_by(5)
            .map(|i| doc.add_object(highlight(i, 20)).into())
            .collect();

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => content_id,
            "Annots" => annots,
        });
        kids.push(page_id.into());
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

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save benchmark PDF");
    buf
}

/// Benchmark glyph selection on one dense page.
fn bench_text_in_rect(c: &mut Criterion) {
    let mut layer = TextLayer::default();
    for i in 0..LINES_PER_PAGE {
        layer.push_str(LINE, 50.0, line_baseline(i), 12.0);
    }
    let rect = Rect::new(49.0, line_baseline(10) - 3.0, 170.0, line_baseline(10) + 11.0);

    c.bench_function("text_in_rect", |b| {
        b.iter(|| black_box(&layer).text_in_rect(black_box(&rect)));
    });
}

/// Benchmark full extraction at various sizes.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let options = ExtractOptions::new().with_scale(ScaleFactors::new(1.05, 1.0).unwrap());

    for page_count in [1, 5, 20] {
        let data = create_test_pdf(page_count);
        group.bench_function(format!("{page_count}_pages"), |b| {
            b.iter(|| {
                extract_highlights_from_bytes(black_box(&data), "bench.pdf", &options).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_text_in_rect, bench_extraction);
criterion_main!(benches);
