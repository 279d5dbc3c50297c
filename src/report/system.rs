use super::{
    Document, Generator, HEADER_BLUE, Metadata,
    layout::{self, MARGIN, TableStyle},
};
use crate::{
    model::AggregateCounts,
    pdf::{Font, ImageId, PAGE_WIDTH, PdfBuilder, Rgb, TextStyle},
};

pub const SYSTEM_REPORT_FILE: &str = "system_report.pdf";
pub const SYSTEM_REPORT_TITLE: &str = "System Report";

pub(super) const HEADING: TextStyle = TextStyle::new(Font::Bold, 18.0, Rgb::BLACK);
pub(super) const BODY: TextStyle = TextStyle::new(Font::Regular, 12.0, Rgb::BLACK);

const METRICS: [&str; 6] = [
    "Total Users",
    "Total Research",
    "Total Comments",
    "Total Threads",
    "Total Posts",
    "Total Feedback",
];

impl Generator<'_> {
    /// Letterhead shared by the metrics documents. `date_line` is printed
    /// below the operator line.
    pub(super) fn metrics_header(
        &self,
        pdf: &mut PdfBuilder,
        logo: Option<ImageId>,
        title: &str,
        metadata: &Metadata,
        date_line: &str,
    ) {
        layout::draw_logo(pdf, logo, (MARGIN, 30.0));
        let page = pdf.page();
        page.text(100.0, 60.0, &HEADING, title);
        page.text(
            MARGIN,
            90.0,
            &BODY,
            &format!(
                "Generated by: {} ({})",
                metadata.generated_by.name,
                metadata.generated_by.role_label()
            ),
        );
        page.text(MARGIN, 105.0, &BODY, date_line);
        page.line((MARGIN, 115.0), (PAGE_WIDTH - MARGIN, 115.0), 0.5, Rgb::BLACK);
    }

    pub fn system(&self, counts: &AggregateCounts, metadata: &Metadata) -> Document {
        let locale = self.locale();
        let (mut pdf, logo) = self.start();
        let date_line = format!(
            "Date: {} | Time: {}",
            locale.format_date(metadata.generated_at),
            locale.format_time(metadata.generated_at)
        );
        self.metrics_header(&mut pdf, logo, SYSTEM_REPORT_TITLE, metadata, &date_line);

        let rows: Vec<Vec<String>> = METRICS
            .iter()
            .zip(counts.values())
            .map(|(metric, value)| vec![metric.to_string(), value.to_string()])
            .collect();
        layout::draw_table(
            &mut pdf,
            130.0,
            &["Metric", "Count"],
            &rows,
            &TableStyle::grid(HEADER_BLUE),
        );

        self.finish(
            pdf,
            SYSTEM_REPORT_TITLE,
            SYSTEM_REPORT_FILE.to_owned(),
            metadata,
            Vec::new(),
        )
    }
}
