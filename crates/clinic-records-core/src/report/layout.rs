//! Page layout: flows a [`Document`] onto fixed-size pages.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Text is measured with the standard Helvetica metrics, which is what the
//! renderer draws with.

use super::composer::{Block, Document, Field};

/// US Letter width in points.
pub const LETTER_WIDTH: f32 = 612.0;
/// US Letter height in points.
pub const LETTER_HEIGHT: f32 = 792.0;

const INCH: f32 = 72.0;

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const NAVY: Rgb = Rgb(0.04, 0.16, 0.35);
    pub const TEAL: Rgb = Rgb(0.0, 0.5, 0.5);
    pub const RED: Rgb = Rgb(1.0, 0.0, 0.0);
    pub const LIGHT_GREY: Rgb = Rgb(0.83, 0.83, 0.83);
}

/// The four Helvetica faces available to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl FontFace {
    fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold | FontFace::BoldOblique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(face: FontFace, size: f32, color: Rgb) -> Self {
        Self { face, size, color }
    }
}

const TITLE: TextStyle = TextStyle::new(FontFace::Bold, 11.0, Rgb::NAVY);
const SECTION: TextStyle = TextStyle::new(FontFace::Bold, 9.0, Rgb::TEAL);
const VISIT: TextStyle = TextStyle::new(FontFace::BoldOblique, 9.0, Rgb::NAVY);
const BODY: TextStyle = TextStyle::new(FontFace::Regular, 7.5, Rgb::BLACK);
const BODY_BOLD: TextStyle = TextStyle::new(FontFace::Bold, 7.5, Rgb::BLACK);
const BODY_LEADING: f32 = 9.0;

/// Page size and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

impl PageGeometry {
    /// US Letter with room at the top for the clinic header.
    pub fn letter() -> Self {
        Self {
            width: LETTER_WIDTH,
            height: LETTER_HEIGHT,
            margin_left: 0.75 * INCH,
            margin_right: 0.75 * INCH,
            margin_top: 1.5 * INCH,
            margin_bottom: 0.4 * INCH,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Highest y a body line may occupy.
    pub fn body_top(&self) -> f32 {
        self.height - self.margin_top
    }

    /// Lowest y a body line may occupy.
    pub fn body_bottom(&self) -> f32 {
        self.margin_bottom
    }
}

/// A piece of text placed at a baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
}

/// A horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub thickness: f32,
    pub color: Rgb,
}

/// Header and footer drawn on a page, independent of the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDecoration {
    pub runs: Vec<TextRun>,
    pub rules: Vec<Rule>,
}

/// One finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutPage {
    /// 1-based page number
    pub number: usize,
    pub body: Vec<TextRun>,
    pub rules: Vec<Rule>,
    pub decoration: PageDecoration,
}

impl LaidOutPage {
    /// All text on the page: decoration first, then body in reading order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.decoration
            .runs
            .iter()
            .chain(self.body.iter())
            .map(|run| run.text.as_str())
    }

    /// Check whether any single run on the page contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }
}

/// Result of laying out a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<LaidOutPage>,
    /// Page breaks requested by the document (not overflow breaks)
    pub forced_breaks: usize,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the first page containing `needle`.
    pub fn find_page(&self, needle: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.contains(needle))
    }

    /// Body text in reading order across all pages.
    pub fn body_text(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.body.iter().map(|run| run.text.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Text measurement
// ---------------------------------------------------------------------------

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Bold faces run roughly six percent wider than regular.
const BOLD_FACTOR: f32 = 1.06;

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => 556,
    }
}

/// Width of `text` in points.
pub fn text_width(text: &str, style: &TextStyle) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c) as u32).sum();
    let width = units as f32 * style.size / 1000.0;
    if style.face.is_bold() {
        width * BOLD_FACTOR
    } else {
        width
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit line breaks are always kept, including empty lines. Words wider
/// than the column are split between characters.
pub fn wrap_text(text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, style) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, style) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = current.clone();
                    next.push(c);
                    if text_width(&next, style) > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    } else {
                        current = next;
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// One unbreakable horizontal slice of the body.
#[derive(Debug, Default)]
struct Line {
    space_before: f32,
    height: f32,
    space_after: f32,
    /// (x offset from the left margin, text, style)
    runs: Vec<(f32, String, TextStyle)>,
    rule: Option<(f32, Rgb)>,
}

enum Flow {
    Line(Line),
    Break,
}

fn leading(style: &TextStyle) -> f32 {
    style.size * 1.2
}

fn single_line(text: String, style: TextStyle, x: f32, before: f32, after: f32) -> Line {
    Line {
        space_before: before,
        height: leading(&style),
        space_after: after,
        runs: vec![(x, text, style)],
        rule: None,
    }
}

/// A heading wrapped to the column, optionally centring each line.
fn heading_lines(
    text: &str,
    style: TextStyle,
    width: f32,
    centred: bool,
    before: f32,
    after: f32,
) -> Vec<Flow> {
    let lines = wrap_text(text, &style, width);
    let count = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let x = if centred {
                ((width - text_width(&line, &style)) / 2.0).max(0.0)
            } else {
                0.0
            };
            let before = if i == 0 { before } else { 0.0 };
            let after = if i + 1 == count { after } else { 0.0 };
            Flow::Line(single_line(line, style, x, before, after))
        })
        .collect()
}

/// Lines of a row of label/value cells. `columns` gives (label width,
/// value width) for each cell.
fn cell_row(fields: &[&Field], columns: &[(f32, f32)], padding: f32) -> Vec<Line> {
    let mut cells: Vec<(f32, Vec<String>, TextStyle)> = Vec::new();
    let mut x = 0.0;
    for (field, (label_width, value_width)) in fields.iter().zip(columns) {
        let label = format!("{}:", field.label);
        cells.push((x, wrap_text(&label, &BODY_BOLD, *label_width - 2.0), BODY_BOLD));
        cells.push((
            x + label_width,
            wrap_text(&field.value, &BODY, *value_width - 2.0),
            BODY,
        ));
        x += label_width + value_width;
    }

    let rows = cells.iter().map(|(_, lines, _)| lines.len()).max().unwrap_or(1);
    (0..rows)
        .map(|i| Line {
            space_before: if i == 0 { padding } else { 0.0 },
            height: BODY_LEADING,
            space_after: if i + 1 == rows { padding } else { 0.0 },
            runs: cells
                .iter()
                .filter_map(|(x, lines, style)| {
                    lines
                        .get(i)
                        .filter(|text| !text.is_empty())
                        .map(|text| (*x, text.clone(), *style))
                })
                .collect(),
            rule: None,
        })
        .collect()
}

fn block_flow(block: &Block, width: f32) -> Vec<Flow> {
    match block {
        Block::Title(text) => heading_lines(text, TITLE, width, true, 5.0, 4.0),
        Block::SectionHeading(text) => {
            let heading = format!("{text}:");
            vec![Flow::Line(single_line(heading, SECTION, 0.0, 6.0, 2.0))]
        }
        Block::VisitHeading(text) => heading_lines(text, VISIT, width, false, 8.0, 2.0),
        Block::Text(text) => {
            let lines = wrap_text(text, &BODY, width);
            let count = lines.len();
            lines
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    Flow::Line(Line {
                        height: BODY_LEADING,
                        space_after: if i + 1 == count { 4.0 } else { 0.0 },
                        runs: vec![(0.0, text, BODY)],
                        ..Default::default()
                    })
                })
                .collect()
        }
        Block::FieldGrid(rows) => rows
            .iter()
            .flat_map(|row| {
                let fields: Vec<&Field> = row.iter().collect();
                let columns = if fields.len() > 1 {
                    vec![(width * 0.1, width * 0.4); fields.len()]
                } else {
                    vec![(width * 0.1, width * 0.9)]
                };
                cell_row(&fields, &columns, 1.0)
            })
            .map(Flow::Line)
            .collect(),
        Block::FieldTable(fields) => {
            let mut flow: Vec<Flow> = fields
                .iter()
                .flat_map(|field| cell_row(&[field], &[(width * 0.2, width * 0.8)], 2.0))
                .map(Flow::Line)
                .collect();
            flow.push(Flow::Line(Line {
                rule: Some((0.5, Rgb::LIGHT_GREY)),
                ..Default::default()
            }));
            flow
        }
        Block::Spacer(height) => vec![Flow::Line(Line {
            height: *height,
            ..Default::default()
        })],
        Block::PageBreak => vec![Flow::Break],
    }
}

struct PageBuilder {
    number: usize,
    cursor: f32,
    body: Vec<TextRun>,
    rules: Vec<Rule>,
}

impl PageBuilder {
    fn new(number: usize, geometry: &PageGeometry) -> Self {
        Self {
            number,
            cursor: geometry.body_top(),
            body: Vec::new(),
            rules: Vec::new(),
        }
    }

    fn is_blank(&self) -> bool {
        self.body.is_empty() && self.rules.is_empty()
    }
}

/// Flow `document` onto pages.
///
/// `decorate` is called exactly once per page, with the page's 1-based
/// number, to produce the page header and footer.
pub fn layout_document<F>(document: &Document, geometry: &PageGeometry, mut decorate: F) -> Layout
where
    F: FnMut(usize, &PageGeometry) -> PageDecoration,
{
    let width = geometry.content_width();
    let left = geometry.margin_left;
    let bottom = geometry.body_bottom();

    let mut pages = Vec::new();
    let mut forced_breaks = 0;
    let mut page = PageBuilder::new(1, geometry);

    let mut finish = |page: PageBuilder, pages: &mut Vec<LaidOutPage>| {
        let decoration = decorate(page.number, geometry);
        pages.push(LaidOutPage {
            number: page.number,
            body: page.body,
            rules: page.rules,
            decoration,
        });
    };

    for flow in document.blocks.iter().flat_map(|block| block_flow(block, width)) {
        let line = match flow {
            Flow::Break => {
                if !page.is_blank() {
                    let next = PageBuilder::new(page.number + 1, geometry);
                    finish(std::mem::replace(&mut page, next), &mut pages);
                    forced_breaks += 1;
                }
                continue;
            }
            Flow::Line(line) => line,
        };

        let before = if page.is_blank() { 0.0 } else { line.space_before };
        if page.cursor - before - line.height < bottom {
            let is_spacer = line.runs.is_empty() && line.rule.is_none();
            let next = PageBuilder::new(page.number + 1, geometry);
            finish(std::mem::replace(&mut page, next), &mut pages);
            if is_spacer {
                continue;
            }
        } else {
            page.cursor -= before;
        }

        // Line height is the leading; the baseline sits one font size down.
        for (x, text, style) in line.runs {
            page.body.push(TextRun {
                text,
                x: left + x,
                y: page.cursor - style.size,
                style,
            });
        }
        page.cursor -= line.height;
        if let Some((thickness, color)) = line.rule {
            page.rules.push(Rule {
                x1: left,
                x2: left + width,
                y: page.cursor,
                thickness,
                color,
            });
        }
        page.cursor -= line.space_after;
    }
    finish(page, &mut pages);

    tracing::debug!(pages = pages.len(), forced_breaks, "Report laid out");
    Layout {
        pages,
        forced_breaks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(blocks: Vec<Block>) -> Document {
        Document {
            title: "test".into(),
            blocks,
        }
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = text_width("Hello", &BODY);
        let large = text_width("Hello", &TITLE);
        assert!(small > 0.0);
        assert!(large > small);
        assert!(text_width("iiii", &BODY) < text_width("WWWW", &BODY));
    }

    #[test]
    fn test_wrap_keeps_explicit_breaks() {
        let lines = wrap_text("first line\n\nthird line", &BODY, 500.0);
        assert_eq!(lines, vec!["first line", "", "third line"]);
    }

    #[test]
    fn test_wrap_long_text() {
        let text = "word ".repeat(100);
        let lines = wrap_text(&text, &BODY, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, &BODY) <= 100.0);
        }
    }

    #[test]
    fn test_wrap_splits_oversized_word() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, &BODY, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_decorate_called_once_per_page() {
        let geometry = PageGeometry::letter();
        let mut blocks = Vec::new();
        for i in 0..200 {
            blocks.push(Block::Text(format!("paragraph {i}")));
        }

        let mut calls = Vec::new();
        let layout = layout_document(&doc(blocks), &geometry, |n, _| {
            calls.push(n);
            PageDecoration::default()
        });

        assert!(layout.page_count() > 1);
        assert_eq!(layout.forced_breaks, 0);
        assert_eq!(calls, (1..=layout.page_count()).collect::<Vec<_>>());
    }

    #[test]
    fn test_body_stays_within_margins() {
        let geometry = PageGeometry::letter();
        let blocks = (0..300).map(|i| Block::Text(format!("line {i}"))).collect();
        let layout = layout_document(&doc(blocks), &geometry, |_, _| PageDecoration::default());

        for page in &layout.pages {
            for run in &page.body {
                assert!(run.y >= geometry.body_bottom());
                assert!(run.y <= geometry.body_top());
            }
        }
    }

    #[test]
    fn test_forced_break_starts_new_page() {
        let geometry = PageGeometry::letter();
        let layout = layout_document(
            &doc(vec![
                Block::Text("before".into()),
                Block::PageBreak,
                Block::Text("after".into()),
            ]),
            &geometry,
            |_, _| PageDecoration::default(),
        );

        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.forced_breaks, 1);
        assert_eq!(layout.find_page("before"), Some(0));
        assert_eq!(layout.find_page("after"), Some(1));
    }

    #[test]
    fn test_break_on_blank_page_is_ignored() {
        let geometry = PageGeometry::letter();
        let layout = layout_document(
            &doc(vec![Block::PageBreak, Block::Text("only".into())]),
            &geometry,
            |_, _| PageDecoration::default(),
        );
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.forced_breaks, 0);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let layout = layout_document(&doc(vec![]), &PageGeometry::letter(), |_, _| {
            PageDecoration::default()
        });
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn test_long_title_wraps_within_margins() {
        let geometry = PageGeometry::letter();
        let name = "Venkata Subrahmanya Lakshmi Narasimha Ramachandra Bhagavatula Srinivasa Raghavendra";
        let title = format!("PATIENT INTAKE RECORD: {name} (Case No: 42)");
        let layout = layout_document(
            &doc(vec![
                Block::Title(title.clone()),
                Block::VisitHeading(format!("Visit 1: {}", "x".repeat(150))),
            ]),
            &geometry,
            |_, _| PageDecoration::default(),
        );

        let body = &layout.pages[0].body;
        let title_runs: Vec<&TextRun> = body.iter().filter(|r| r.style == TITLE).collect();
        assert!(title_runs.len() > 1);
        assert!(body.iter().filter(|r| r.style == VISIT).count() > 1);

        let right = geometry.width - geometry.margin_right;
        for run in body {
            assert!(run.x >= geometry.margin_left);
            assert!(run.x + text_width(&run.text, &run.style) <= right + 0.01);
        }

        let joined = title_runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(joined, title);
    }

    #[test]
    fn test_field_table_draws_rule() {
        let layout = layout_document(
            &doc(vec![Block::FieldTable(vec![Field::new("Treatment", "Sulph 200")])]),
            &PageGeometry::letter(),
            |_, _| PageDecoration::default(),
        );
        let page = &layout.pages[0];
        assert_eq!(page.rules.len(), 1);
        assert!(page.contains("Treatment:"));
        assert!(page.contains("Sulph 200"));
    }
}
