use chrono::NaiveDate;

use super::{
    Document, Generator, HEADER_BLUE, Metadata,
    layout::{self, MARGIN, TableStyle},
    system::BODY,
};
use crate::{locale::file_safe, model::DailyCount};

pub const ACTIVITY_REPORT_TITLE: &str = "Comments & Feedback Report";

fn rows(counts: &[DailyCount]) -> Vec<Vec<String>> {
    counts
        .iter()
        .map(|DailyCount { date, count }| vec![date.clone(), count.to_string()])
        .collect()
}

impl Generator<'_> {
    /// `comments_feedback_report_<date>.pdf` for the given calendar date.
    pub fn activity_file_name(&self, selected_date: NaiveDate) -> String {
        format!(
            "comments_feedback_report_{}.pdf",
            file_safe(&self.locale().format_naive_date(selected_date))
        )
    }

    /// Comments per day on the first page, feedback per day on the second.
    pub fn activity(
        &self,
        comments: &[DailyCount],
        feedback: &[DailyCount],
        selected_date: NaiveDate,
        metadata: &Metadata,
    ) -> Document {
        let (mut pdf, logo) = self.start();
        let date_line = format!(
            "Date: {}",
            self.locale().format_naive_date(selected_date)
        );
        self.metrics_header(&mut pdf, logo, ACTIVITY_REPORT_TITLE, metadata, &date_line);

        let style = TableStyle::grid(HEADER_BLUE);
        pdf.page().text(MARGIN, 130.0, &BODY, "Comments per Day");
        layout::draw_table(&mut pdf, 150.0, &["Date", "Count"], &rows(comments), &style);

        pdf.add_page().text(MARGIN, 40.0, &BODY, "Feedback per Day");
        layout::draw_table(&mut pdf, 60.0, &["Date", "Count"], &rows(feedback), &style);

        self.finish(
            pdf,
            ACTIVITY_REPORT_TITLE,
            self.activity_file_name(selected_date),
            metadata,
            Vec::new(),
        )
    }
}
