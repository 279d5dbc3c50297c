//! Plain-text rendering of the view state for the terminal.

use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

use crate::{
    chart::ChartData,
    locale::Locale,
    model::{AggregateCounts, DailyCount, Expert, ResearchRecord},
    report::summary_table,
    view::{ExpertView, MetricsView},
};

/// Left-aligned columns padded by display width, with a rule under the header.
pub fn text_table<H: AsRef<str>>(header: &[H], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.width())
                .chain([header[i].as_ref().width()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = pad_line(header.iter().map(|h| h.as_ref()), &widths);
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).join("  "));
    for row in rows {
        out.push('\n');
        out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell}{}", " ".repeat(width - cell.width())))
        .join("  ")
        .trim_end()
        .to_owned()
}

/// Visible text of an HTML fragment with whitespace collapsed.
pub fn flatten_html(html: &str) -> String {
    scraper::Html::parse_fragment(html)
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .join(" ")
}

pub fn experts(experts: &[Expert]) -> String {
    let rows: Vec<Vec<String>> = experts
        .iter()
        .map(|expert| vec![expert.id.to_string(), expert.name.clone()])
        .collect();
    text_table(&["ID", "Name"], &rows)
}

/// Research list with the ID column followed by the active columns.
pub fn research(view: &ExpertView, locale: &Locale) -> String {
    let table = summary_table(&view.records, &view.visible_columns(), locale);
    let header: Vec<&str> = ["ID"].into_iter().chain(table.header()).collect();
    let rows: Vec<Vec<String>> = view
        .records
        .iter()
        .zip(table.rows)
        .map(|(record, cells)| {
            let marker = if view.expanded.as_ref() == Some(&record.id) {
                format!("{} *", record.id)
            } else {
                record.id.to_string()
            };
            [marker].into_iter().chain(cells).collect()
        })
        .collect();
    text_table(&header, &rows)
}

pub fn detail(record: &ResearchRecord) -> String {
    format!(
        "Research {}: {}\n{}\nImages: {}\nFeedback: {}",
        record.id,
        record.title,
        flatten_html(&record.content),
        record.images.len(),
        record.feedbacks.len()
    )
}

pub fn counts(counts: &AggregateCounts) -> String {
    let ChartData { labels, series } = counts.into();
    let rows: Vec<Vec<String>> = labels
        .into_iter()
        .zip(series)
        .map(|(label, value)| vec![label, value.to_string()])
        .collect();
    text_table(&["Metric", "Count"], &rows)
}

pub fn daily(title: &str, days: &[DailyCount]) -> String {
    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|day| vec![day.date.clone(), day.count.to_string()])
        .collect();
    format!("{title}\n{}", text_table(&["Date", "Count"], &rows))
}

/// `Loading...` while a fetch is in flight, the error text after a failure.
pub fn status(loading: bool, error: Option<&str>) -> Option<String> {
    match (loading, error) {
        (true, _) => Some("Loading...".to_owned()),
        (false, Some(error)) => Some(format!("Error: {error}")),
        (false, None) => None,
    }
}

pub fn expert_page(view: &ExpertView, locale: &Locale) -> String {
    if let Some(status) = status(view.loading, view.error()) {
        return status;
    }
    let mut out = research(view, locale);
    if let Some(record) = view.expanded_record() {
        out.push_str("\n\n");
        out.push_str(&detail(record));
    }
    out
}

pub fn metrics_page(view: &MetricsView) -> String {
    if let Some(status) = status(view.loading(), view.error()) {
        return status;
    }
    let mut sections = Vec::new();
    if let Some(totals) = &view.counts {
        sections.push(counts(totals));
    }
    sections.push(daily("Comments per Day", &view.daily.comments));
    sections.push(daily("Feedback per Day", &view.daily.feedback));
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        model::{Feedback, Identifier},
        options::ReportOption,
        view::expert::Message,
    };

    fn record(id: &str, title: &str) -> ResearchRecord {
        ResearchRecord {
            id: Identifier::new(id),
            title: title.into(),
            author: "Kim".into(),
            date_published: None,
            category: "Soil".into(),
            latitude: None,
            longitude: None,
            content: "<p>Rainfall <b>data</b></p>\n<ul><li>one</li></ul>".into(),
            images: Vec::new(),
            feedbacks: vec![Feedback {
                content: "ok".into(),
            }],
        }
    }

    #[test]
    fn test_text_table_pads_by_display_width() {
        let table = text_table(
            &["Name", "N"],
            &[
                vec!["土壌".into(), "1".into()],
                vec!["ab".into(), "22".into()],
            ],
        );
        assert_eq!(table, "Name  N\n----  --\n土壌  1\nab    22");
    }

    #[test]
    fn test_flatten_html() {
        assert_eq!(
            flatten_html("<p>Rainfall <b>data</b></p>\n<ul><li>one</li></ul>"),
            "Rainfall data one"
        );
        assert_eq!(flatten_html("plain"), "plain");
    }

    #[test]
    fn test_research_shows_id_and_active_columns() {
        let mut view = ExpertView::new();
        view.records = vec![record("1", "Maize"), record("2", "Rice")];
        view.update(Message::SetOption(ReportOption::Date, false));
        view.update(Message::SetOption(ReportOption::Coordinates, false));
        view.update(Message::ToggleExpand(Identifier::new("2")));

        let out = expert_page(&view, &Locale::pinned(0));
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("ID   Title  Author  Category"));
        assert!(out.contains("2 *  Rice"));
        assert!(out.ends_with("Research 2: Rice\nRainfall data one\nImages: 0\nFeedback: 1"));
    }

    #[test]
    fn test_status_precedes_content() {
        let mut view = ExpertView::new();
        view.research_error = Some("boom".into());
        assert_eq!(expert_page(&view, &Locale::pinned(0)), "Error: boom");
        view.loading = true;
        assert_eq!(expert_page(&view, &Locale::pinned(0)), "Loading...");
    }

    fn day(date: &str, count: u64) -> DailyCount {
        DailyCount {
            date: date.into(),
            count,
        }
    }

    #[test]
    fn test_counts_list_metrics_in_label_order() {
        let totals = AggregateCounts {
            total_users: 12,
            total_research: 7,
            total_comments: 130,
            total_threads: 4,
            total_posts: 9,
            total_feedback: 3,
        };
        assert_eq!(
            counts(&totals),
            "Metric    Count\n--------  -----\nUsers     12\nResearch  7\nComments  130\n\
             Threads   4\nPosts     9\nFeedback  3"
        );
    }

    #[test]
    fn test_daily_has_title_and_rows() {
        assert_eq!(
            daily("Comments per Day", &[day("2024-07-01", 5)]),
            "Comments per Day\nDate        Count\n----------  -----\n2024-07-01  5"
        );
        assert_eq!(
            daily("Feedback per Day", &[]),
            "Feedback per Day\nDate  Count\n----  -----"
        );
    }

    #[test]
    fn test_metrics_page_sections() {
        let mut view = MetricsView::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        view.daily.comments = vec![day("2024-07-01", 5)];
        let out = metrics_page(&view);
        assert!(out.starts_with("Comments per Day\n"));
        assert!(out.contains("\n\nFeedback per Day\n"));

        view.counts = Some(AggregateCounts::default());
        let out = metrics_page(&view);
        assert!(out.starts_with("Metric    Count\n"));
        assert_eq!(out.matches("\n\n").count(), 2);

        view.daily_error = Some("feedback unavailable".into());
        assert_eq!(metrics_page(&view), "Error: feedback unavailable");
    }
}
