//! Page furniture shared by every report: logo header and grid tables.

use crate::pdf::{Font, ImageId, PAGE_HEIGHT, PAGE_WIDTH, PdfBuilder, Rgb, TextStyle, metrics};

pub const MARGIN: f32 = 40.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest baseline/row edge allowed before breaking to a new page.
pub const BOTTOM_LIMIT: f32 = PAGE_HEIGHT - MARGIN;

pub const LOGO_SIZE: f32 = 50.0;

pub fn draw_logo(pdf: &mut PdfBuilder, logo: Option<ImageId>, at: (f32, f32)) {
    if let Some(logo) = logo {
        pdf.page().image(logo, at, (LOGO_SIZE, LOGO_SIZE));
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TableStyle {
    pub font_size: f32,
    pub padding: f32,
    pub head_fill: Rgb,
    pub head_text: Rgb,
    pub body_text: Rgb,
    pub alternate_fill: Option<Rgb>,
    pub grid: Rgb,
}

impl TableStyle {
    pub fn grid(head_fill: Rgb) -> Self {
        Self {
            font_size: 10.0,
            padding: 5.0,
            head_fill,
            head_text: Rgb::WHITE,
            body_text: Rgb::gray(20),
            alternate_fill: None,
            grid: Rgb::gray(200),
        }
    }

    pub fn body_text(self, color: Rgb) -> Self {
        Self {
            body_text: color,
            ..self
        }
    }

    pub fn alternate_fill(self, color: Rgb) -> Self {
        Self {
            alternate_fill: Some(color),
            ..self
        }
    }
}

struct Row {
    cells: Vec<Vec<String>>,
    style: TextStyle,
    fill: Option<Rgb>,
}

impl Row {
    fn lines(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }

    fn height(&self, padding: f32) -> f32 {
        self.lines() as f32 * self.style.line_height() + 2.0 * padding
    }

    /// Lines of this row that fit in `space`.
    fn lines_within(&self, space: f32, padding: f32) -> usize {
        ((space - 2.0 * padding) / self.style.line_height()).floor().max(0.0) as usize
    }

    /// Split after the first `lines` lines of every cell.
    fn split(mut self, lines: usize) -> (Row, Row) {
        let rest = self
            .cells
            .iter_mut()
            .map(|cell| cell.split_off(lines.min(cell.len())))
            .collect();
        let rest = Row {
            cells: rest,
            style: self.style,
            fill: self.fill,
        };
        (self, rest)
    }
}

fn layout_row<S: AsRef<str>>(
    cells: &[S],
    column_width: f32,
    style: TextStyle,
    padding: f32,
    fill: Option<Rgb>,
) -> Row {
    Row {
        cells: cells
            .iter()
            .map(|cell| {
                metrics::wrap(
                    cell.as_ref(),
                    style.font,
                    style.size,
                    column_width - 2.0 * padding,
                )
            })
            .collect(),
        style,
        fill,
    }
}

fn draw_row(pdf: &mut PdfBuilder, row: &Row, y: f32, column_width: f32, table: &TableStyle) -> f32 {
    let height = row.height(table.padding);
    let page = pdf.page();
    for (i, lines) in row.cells.iter().enumerate() {
        let x = MARGIN + i as f32 * column_width;
        page.rect((x, y), (column_width, height), row.fill, Some((0.1, table.grid)));
        let baseline = y + table.padding + row.style.size * 0.85;
        page.lines(x + table.padding, baseline, &row.style, lines);
    }
    y + height
}

/// Draw a grid table across the content width starting at `start_y`.
///
/// A row that does not fit moves to a new page, which repeats the header row.
/// A row taller than a page is split between its wrapped lines.
/// Returns the y coordinate below the last row.
pub fn draw_table<H: AsRef<str>>(
    pdf: &mut PdfBuilder,
    start_y: f32,
    header: &[H],
    rows: &[Vec<String>],
    table: &TableStyle,
) -> f32 {
    if header.is_empty() {
        return start_y;
    }
    let column_width = CONTENT_WIDTH / header.len() as f32;
    let head_style = TextStyle::new(Font::Bold, table.font_size, table.head_text);
    let body_style = TextStyle::new(Font::Regular, table.font_size, table.body_text);
    let head = layout_row(
        header,
        column_width,
        head_style,
        table.padding,
        Some(table.head_fill),
    );

    let page_top = MARGIN + head.height(table.padding);
    let mut y = draw_row(pdf, &head, start_y, column_width, table);
    let mut rows_on_page = 0;
    for (index, cells) in rows.iter().enumerate() {
        let fill = table.alternate_fill.filter(|_| index % 2 == 0);
        let mut row = layout_row(cells, column_width, body_style, table.padding, fill);
        loop {
            let height = row.height(table.padding);
            if y + height <= BOTTOM_LIMIT {
                y = draw_row(pdf, &row, y, column_width, table);
                break;
            }
            let fits_fresh_page = page_top + height <= BOTTOM_LIMIT;
            let mut lines = row.lines_within(BOTTOM_LIMIT - y, table.padding);
            if y <= page_top {
                // Nothing gains from another page; draw at least one line.
                lines = lines.max(1);
            } else if rows_on_page > 0 && fits_fresh_page {
                lines = 0;
            }
            if lines > 0 {
                let (part, rest) = row.split(lines);
                draw_row(pdf, &part, y, column_width, table);
                row = rest;
            }
            pdf.add_page();
            y = draw_row(pdf, &head, MARGIN, column_width, table);
            rows_on_page = 0;
        }
        rows_on_page += 1;
    }
    y
}

/// Draw wrapped text, continuing at the top of a new page when it reaches the bottom.
pub fn draw_paragraph(pdf: &mut PdfBuilder, x: f32, y: f32, style: &TextStyle, width: f32, text: &str) -> f32 {
    let mut y = y;
    for line in metrics::wrap(text, style.font, style.size, width) {
        if y > BOTTOM_LIMIT {
            pdf.add_page();
            y = MARGIN;
        }
        pdf.page().text(x, y, style, &line);
        y += style.line_height();
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header_draws_nothing() {
        let mut pdf = PdfBuilder::new();
        let y = draw_table::<&str>(&mut pdf, 120.0, &[], &[], &TableStyle::grid(Rgb::BLACK));
        assert_eq!(y, 120.0);
        assert!(pdf.pages()[0].content().is_empty());
    }

    #[test]
    fn test_long_tables_break_pages_and_repeat_header() {
        let mut pdf = PdfBuilder::new();
        let rows: Vec<Vec<String>> = (0..200).map(|i| vec![i.to_string()]).collect();
        draw_table(&mut pdf, 120.0, &["Number"], &rows, &TableStyle::grid(Rgb::BLACK));
        assert!(pdf.page_count() > 1);
        for page in pdf.pages() {
            let content = String::from_utf8_lossy(page.content());
            assert!(content.contains("(Number) Tj"));
        }
    }

    /// Baselines of every `Td` operator, in top-left page coordinates.
    fn baselines(content: &[u8]) -> Vec<f32> {
        String::from_utf8_lossy(content)
            .lines()
            .filter_map(|line| {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let td = tokens.iter().position(|t| *t == "Td")?;
                let y: f32 = tokens.get(td.checked_sub(1)?)?.parse().ok()?;
                Some(PAGE_HEIGHT - y)
            })
            .collect()
    }

    #[test]
    fn test_row_taller_than_page_is_split() {
        let mut pdf = PdfBuilder::new();
        let title = vec!["word"; 4000].join(" ");
        let rows = vec![vec![title, "X".into()]];
        let y = draw_table(
            &mut pdf,
            120.0,
            &["Title", "Author"],
            &rows,
            &TableStyle::grid(Rgb::BLACK),
        );
        assert!(pdf.page_count() > 2);
        assert!(y <= BOTTOM_LIMIT);
        let mut words = 0;
        for page in pdf.pages() {
            let content = String::from_utf8_lossy(page.content());
            assert!(content.contains("(Title) Tj"));
            words += content.matches("word").count();
            for baseline in baselines(page.content()) {
                assert!(baseline > 0.0 && baseline < BOTTOM_LIMIT, "{baseline}");
            }
        }
        assert_eq!(words, 4000);
    }

    #[test]
    fn test_row_that_fits_a_fresh_page_moves_whole() {
        let mut pdf = PdfBuilder::new();
        let mut rows: Vec<Vec<String>> = (0..28).map(|i| vec![i.to_string()]).collect();
        rows.push(vec![vec!["line"; 20].join("\n")]);
        draw_table(&mut pdf, 120.0, &["Number"], &rows, &TableStyle::grid(Rgb::BLACK));
        assert_eq!(pdf.page_count(), 2);
        let first = String::from_utf8_lossy(pdf.pages()[0].content());
        let second = String::from_utf8_lossy(pdf.pages()[1].content());
        assert!(!first.contains("(line) Tj"));
        assert_eq!(second.matches("(line) Tj").count(), 20);
    }

    #[test]
    fn test_paragraph_continues_on_new_page() {
        let mut pdf = PdfBuilder::new();
        let style = TextStyle::new(Font::Regular, 10.0, Rgb::BLACK);
        let text = vec!["line"; 100].join("\n");
        draw_paragraph(&mut pdf, MARGIN, 65.0, &style, 500.0, &text);
        assert_eq!(pdf.page_count(), 2);
    }
}
