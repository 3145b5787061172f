//! PDF output via `printpdf` using the builtin Helvetica faces.

use std::io::{BufWriter, Write};
use std::path::Path;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb as PdfRgb,
};

use super::layout::{FontFace, LaidOutPage, Layout, PageGeometry, Rgb, Rule, TextRun};
use super::{ReportError, ReportResult};

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(rgb.0, rgb.1, rgb.2, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    bold_oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> ReportResult<Self> {
        let add = |font| {
            doc.add_builtin_font(font)
                .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))
        };
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            oblique: add(BuiltinFont::HelveticaOblique)?,
            bold_oblique: add(BuiltinFont::HelveticaBoldOblique)?,
        })
    }

    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Oblique => &self.oblique,
            FontFace::BoldOblique => &self.bold_oblique,
        }
    }
}

fn draw_text(layer: &PdfLayerReference, fonts: &Fonts, run: &TextRun) {
    layer.set_fill_color(color(run.style.color));
    layer.use_text(
        run.text.as_str(),
        run.style.size,
        mm(run.x),
        mm(run.y),
        fonts.get(run.style.face),
    );
}

fn draw_rule(layer: &PdfLayerReference, rule: &Rule) {
    layer.set_outline_color(color(rule.color));
    layer.set_outline_thickness(rule.thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(mm(rule.x1), mm(rule.y)), false),
            (Point::new(mm(rule.x2), mm(rule.y)), false),
        ],
        is_closed: false,
    });
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, page: &LaidOutPage) {
    for rule in page.decoration.rules.iter().chain(&page.rules) {
        draw_rule(layer, rule);
    }
    for run in page.decoration.runs.iter().chain(&page.body) {
        draw_text(layer, fonts, run);
    }
}

/// Render laid-out pages to PDF bytes.
pub fn render_pdf(title: &str, layout: &Layout, geometry: &PageGeometry) -> ReportResult<Vec<u8>> {
    let (width, height) = (mm(geometry.width), mm(geometry.height));
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let fonts = Fonts::load(&doc)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, &fonts, page);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))
}

/// Write `bytes` to `destination` through a temporary file in the same
/// directory, so a failed write leaves nothing at `destination`.
pub fn write_atomically(bytes: &[u8], destination: &Path) -> ReportResult<()> {
    let write_err = |source: std::io::Error| ReportError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".report-")
        .suffix(".pdf.part")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(destination).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{layout_document, PageDecoration};
    use crate::report::composer::{Block, Document};

    fn small_layout() -> Layout {
        let doc = Document {
            title: "t".into(),
            blocks: vec![
                Block::Title("Hello".into()),
                Block::PageBreak,
                Block::Text("World".into()),
            ],
        };
        layout_document(&doc, &PageGeometry::letter(), |_, _| PageDecoration::default())
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_pdf("t", &small_layout(), &PageGeometry::letter()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        write_atomically(b"%PDF-1.3", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.3");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("out.pdf");
        let err = write_atomically(b"x", &dest).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
        assert!(!dest.exists());
    }
}
