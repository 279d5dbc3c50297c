use tracing::{info, warn};

use super::{
    Document, FOREST_GREEN, Generator, Metadata, Warning,
    layout::{self, MARGIN, TableStyle},
    table::summary_table,
};
use crate::{
    model::{Feedback, Image, ResearchRecord},
    options::{ReportOptions, Section},
    pdf::{
        DecodeError, Font, PAGE_HEIGHT, PAGE_WIDTH, PdfBuilder, RasterImage, Rgb, TextStyle, metrics,
    },
};

pub const EXPERT_REPORT_FILE: &str = "expert_research_reports.pdf";
pub const EXPERT_REPORT_TITLE: &str = "Expert Research Reports";

pub const CONFIDENTIALITY_NOTICE: &str = "This report is confidential and intended solely for the use of the individual or entity to whom it is addressed. Unauthorized review, use, disclosure, or distribution is prohibited.";

const TITLE: TextStyle = TextStyle::new(Font::Regular, 18.0, FOREST_GREEN);
const BODY: TextStyle = TextStyle::new(Font::Regular, 12.0, Rgb::BLACK);
const DETAIL_HEADING: TextStyle = TextStyle::new(Font::Regular, 14.0, FOREST_GREEN);
const CAPTION: TextStyle = TextStyle::new(Font::Regular, 10.0, Rgb::BLACK);
const FOOTER: TextStyle = TextStyle::new(Font::Regular, 10.0, Rgb(100, 100, 100));

const IMAGE_BOX: (f32, f32) = (500.0, 375.0);
const TEXT_WIDTH: f32 = 500.0;

fn decode(image: &Image) -> Result<RasterImage, DecodeError> {
    RasterImage::decode(&image.decode_payload()?)
}

/// Counts images against the per-document bound.
struct ImageBudget {
    limit: Option<usize>,
    used: usize,
    skipped: usize,
}

impl ImageBudget {
    fn take(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.used >= limit => {
                self.skipped += 1;
                false
            }
            _ => {
                self.used += 1;
                true
            }
        }
    }
}

impl Generator<'_> {
    /// Build the expert research document.
    ///
    /// The summary table shows exactly the columns enabled in `options`.
    /// Image and feedback pages follow for records that have any, one page per
    /// item. An image that cannot be decoded is left out and reported in
    /// [`Document::warnings`].
    pub fn expert_research(
        &self,
        records: &[ResearchRecord],
        options: &ReportOptions,
        metadata: &Metadata,
    ) -> Document {
        let locale = self.locale();
        let (mut pdf, logo) = self.start();
        let mut warnings = Vec::new();

        layout::draw_logo(&mut pdf, logo, (MARGIN, 30.0));
        let page = pdf.page();
        page.text(110.0, 60.0, &TITLE, EXPERT_REPORT_TITLE);
        page.text(
            110.0,
            80.0,
            &BODY,
            &format!("Generated by: {}", metadata.generated_by.name),
        );
        page.text(
            110.0,
            95.0,
            &BODY,
            &format!(
                "Date: {} | Time: {}",
                locale.format_date(metadata.generated_at),
                locale.format_time(metadata.generated_at)
            ),
        );
        page.line((MARGIN, 110.0), (PAGE_WIDTH - MARGIN, 110.0), 0.5, Rgb::gray(200));

        let table = summary_table(records, &options.columns(), locale);
        layout::draw_table(
            &mut pdf,
            120.0,
            &table.header(),
            &table.rows,
            &TableStyle::grid(FOREST_GREEN)
                .body_text(Rgb::BLACK)
                .alternate_fill(Rgb::gray(245)),
        );

        if options.has_detail_sections() {
            let mut budget = ImageBudget {
                limit: self.template.max_images,
                used: 0,
                skipped: 0,
            };
            for record in records {
                if options.includes(Section::Images) {
                    image_pages(&mut pdf, record, &mut budget, &mut warnings);
                }
                if options.includes(Section::Feedback) {
                    feedback_pages(&mut pdf, record);
                }
            }
            if let (Some(limit), skipped @ 1..) = (budget.limit, budget.skipped) {
                warn!(limit, skipped, "image limit reached");
                warnings.push(Warning::ImageLimitReached { limit, skipped });
            }
        }

        // Footer goes on the last page only.
        let notice = metrics::wrap(CONFIDENTIALITY_NOTICE, FOOTER.font, FOOTER.size, TEXT_WIDTH);
        pdf.page().lines(MARGIN, PAGE_HEIGHT - 30.0, &FOOTER, &notice);

        info!(
            records = records.len(),
            warnings = warnings.len(),
            "expert research report assembled"
        );
        self.finish(
            pdf,
            EXPERT_REPORT_TITLE,
            EXPERT_REPORT_FILE.to_owned(),
            metadata,
            warnings,
        )
    }
}

fn image_pages(
    pdf: &mut PdfBuilder,
    record: &ResearchRecord,
    budget: &mut ImageBudget,
    warnings: &mut Vec<Warning>,
) {
    for (i, image) in record.images.iter().enumerate() {
        let index = i + 1;
        if !budget.take() {
            continue;
        }
        let raster = match decode(image) {
            Ok(raster) => raster,
            Err(error) => {
                warn!(%error, research_id = %record.id, index, "skipping undecodable image");
                warnings.push(Warning::UndecodableImage {
                    research_id: record.id.clone(),
                    index,
                    reason: error.to_string(),
                });
                continue;
            }
        };
        let size = raster.fit(IMAGE_BOX.0, IMAGE_BOX.1);
        let id = pdf.add_image(raster);
        let page = pdf.add_page();
        page.text(
            MARGIN,
            30.0,
            &DETAIL_HEADING,
            &format!("Research ID: {} - Images", record.id),
        );
        page.image(id, (MARGIN, 50.0), size);
        page.text(
            MARGIN,
            440.0,
            &CAPTION,
            &format!("Description: Image {index} for Research ID {}", record.id),
        );
    }
}

fn feedback_pages(pdf: &mut PdfBuilder, record: &ResearchRecord) {
    for (i, Feedback { content }) in record.feedbacks.iter().enumerate() {
        let page = pdf.add_page();
        page.text(
            MARGIN,
            30.0,
            &DETAIL_HEADING,
            &format!("Feedback for Research ID: {}", record.id),
        );
        page.text(MARGIN, 50.0, &BODY, &format!("Feedback {}:", i + 1));
        layout::draw_paragraph(pdf, MARGIN, 65.0, &CAPTION, TEXT_WIDTH, content);
    }
}
