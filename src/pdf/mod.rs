//! Minimal fixed-layout PDF writer.
//!
//! Pages are addressed top-down in points, with the origin at the top-left
//! corner of an A4 portrait page. Text uses the standard Helvetica faces, so
//! no fonts are embedded.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

pub mod metrics;
mod raster;

pub use raster::{ColorSpace, DecodeError, RasterImage, Samples};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }

    fn components(self) -> String {
        format!(
            "{} {} {}",
            number(self.0 as f32 / 255.0),
            number(self.1 as f32 / 255.0),
            number(self.2 as f32 / 255.0)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, color: Rgb) -> Self {
        Self { font, size, color }
    }

    /// Baseline-to-baseline distance.
    pub fn line_height(&self) -> f32 {
        self.size * 1.15
    }

    pub fn width(&self, text: &str) -> f32 {
        metrics::text_width(text, self.font, self.size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageId(usize);

#[derive(Default)]
pub struct Page {
    content: Vec<u8>,
    images: BTreeSet<ImageId>,
}

/// Compact decimal rendering for content stream operands.
fn number(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

/// Encode `text` as a WinAnsi literal string, escaping everything outside printable ASCII.
fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        let byte = match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
                continue;
            }
            ' '..='~' => {
                out.push(c);
                continue;
            }
            '\t' => {
                out.push(' ');
                continue;
            }
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        };
        out.push_str(&format!("\\{byte:03o}"));
    }
    out.push(')');
    out
}

impl Page {
    fn push(&mut self, op: impl AsRef<str>) {
        self.content.extend_from_slice(op.as_ref().as_bytes());
        self.content.push(b'\n');
    }

    /// Draw one line of text with its baseline at `y`.
    pub fn text(&mut self, x: f32, y: f32, style: &TextStyle, text: &str) {
        self.push(format!(
            "BT /{} {} Tf {} rg {} {} Td {} Tj ET",
            style.font.resource(),
            number(style.size),
            style.color.components(),
            number(x),
            number(PAGE_HEIGHT - y),
            literal(text)
        ));
    }

    /// Draw pre-wrapped lines starting with the first baseline at `y`.
    /// Returns the baseline after the last line.
    pub fn lines<S: AsRef<str>>(&mut self, x: f32, y: f32, style: &TextStyle, lines: &[S]) -> f32 {
        let mut y = y;
        for line in lines {
            self.text(x, y, style, line.as_ref());
            y += style.line_height();
        }
        y
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.push(format!(
            "q {} w {} RG {} {} m {} {} l S Q",
            number(width),
            color.components(),
            number(from.0),
            number(PAGE_HEIGHT - from.1),
            number(to.0),
            number(PAGE_HEIGHT - to.1)
        ));
    }

    /// Rectangle with its top-left corner at (`x`, `y`).
    pub fn rect(
        &mut self,
        (x, y): (f32, f32),
        (width, height): (f32, f32),
        fill: Option<Rgb>,
        stroke: Option<(f32, Rgb)>,
    ) {
        let paint = match (fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };
        let mut op = String::from("q ");
        if let Some(fill) = fill {
            op.push_str(&format!("{} rg ", fill.components()));
        }
        if let Some((line_width, color)) = stroke {
            op.push_str(&format!("{} w {} RG ", number(line_width), color.components()));
        }
        op.push_str(&format!(
            "{} {} {} {} re {paint} Q",
            number(x),
            number(PAGE_HEIGHT - y - height),
            number(width),
            number(height)
        ));
        self.push(op);
    }

    /// Place an image with its top-left corner at (`x`, `y`).
    pub fn image(&mut self, id: ImageId, (x, y): (f32, f32), (width, height): (f32, f32)) {
        self.images.insert(id);
        self.push(format!(
            "q {} 0 0 {} {} {} cm /Im{} Do Q",
            number(width),
            number(height),
            number(x),
            number(PAGE_HEIGHT - y - height),
            id.0
        ));
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Accumulates pages and images, then serializes them with [`PdfBuilder::finish`].
pub struct PdfBuilder {
    pages: Vec<Page>,
    images: Vec<RasterImage>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    /// A document with one blank page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            images: Vec::new(),
        }
    }

    pub fn add_page(&mut self) -> &mut Page {
        self.pages.push(Page::default());
        self.page()
    }

    /// The page currently being drawn on.
    pub fn page(&mut self) -> &mut Page {
        // `pages` is never empty: `new` seeds it and pages are never removed.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn add_image(&mut self, image: RasterImage) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len())
    }

    pub fn finish(self, info: &DocumentInfo<'_>) -> Vec<u8> {
        const CATALOG: usize = 1;
        const PAGES: usize = 2;
        const REGULAR: usize = 3;
        const BOLD: usize = 4;
        const INFO: usize = 5;
        let first_image = INFO + 1;
        let first_page = first_image + self.images.len();
        let object_count = first_page + self.pages.len() * 2 - 1;

        let mut out: Vec<u8> = Vec::new();
        let mut offsets = vec![0usize; object_count + 1];
        out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

        let mut object = |out: &mut Vec<u8>, id: usize, body: &[u8]| {
            offsets[id] = out.len();
            out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        };

        object(
            &mut out,
            CATALOG,
            format!("<< /Type /Catalog /Pages {PAGES} 0 R >>").as_bytes(),
        );
        let kids = (0..self.pages.len())
            .map(|i| format!("{} 0 R", first_page + i * 2))
            .collect::<Vec<_>>()
            .join(" ");
        object(
            &mut out,
            PAGES,
            format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} >>",
                self.pages.len()
            )
            .as_bytes(),
        );
        object(
            &mut out,
            REGULAR,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        object(
            &mut out,
            BOLD,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );
        object(
            &mut out,
            INFO,
            format!(
                "<< /Title {} /Producer (admin-reports) /CreationDate (D:{}Z) >>",
                literal(info.title),
                info.created_at.format("%Y%m%d%H%M%S")
            )
            .as_bytes(),
        );

        for (i, image) in self.images.iter().enumerate() {
            let (filter, data) = match &image.samples {
                Samples::Jpeg { data } => (" /Filter /DCTDecode", data),
                Samples::Flate { data } => (" /Filter /FlateDecode", data),
            };
            let mut body = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8{filter} /Length {} >>\nstream\n",
                image.width,
                image.height,
                image.color.pdf_name(),
                data.len()
            )
            .into_bytes();
            body.extend_from_slice(data);
            body.extend_from_slice(b"\nendstream");
            object(&mut out, first_image + i, &body);
        }

        for (i, page) in self.pages.iter().enumerate() {
            let page_id = first_page + i * 2;
            let content_id = page_id + 1;
            let xobjects = if page.images.is_empty() {
                String::new()
            } else {
                let entries = page
                    .images
                    .iter()
                    .map(|ImageId(n)| format!("/Im{n} {} 0 R", first_image + n - 1))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(" /XObject << {entries} >>")
            };
            object(
                &mut out,
                page_id,
                format!(
                    "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] /Contents {content_id} 0 R /Resources << /Font << /F1 {REGULAR} 0 R /F2 {BOLD} 0 R >>{xobjects} >> >>",
                    number(PAGE_WIDTH),
                    number(PAGE_HEIGHT)
                )
                .as_bytes(),
            );
            let mut body = format!("<< /Length {} >>\nstream\n", page.content.len()).into_bytes();
            body.extend_from_slice(&page.content);
            body.extend_from_slice(b"\nendstream");
            object(&mut out, content_id, &body);
        }

        let xref = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", object_count + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets[1..] {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref}\n%%EOF\n",
                object_count + 1
            )
            .as_bytes(),
        );
        out
    }
}
