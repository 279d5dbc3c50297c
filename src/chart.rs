//! Reshapes already-aggregated figures into chart series.

use serde::Serialize;

use crate::model::{AggregateCounts, DailyCount};

/// Parallel label/value vectors, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<u64>,
}

impl From<&AggregateCounts> for ChartData {
    fn from(counts: &AggregateCounts) -> Self {
        Self {
            labels: AggregateCounts::LABELS.iter().map(|l| l.to_string()).collect(),
            series: counts.values().to_vec(),
        }
    }
}

impl From<&[DailyCount]> for ChartData {
    fn from(days: &[DailyCount]) -> Self {
        Self {
            labels: days.iter().map(|day| day.date.clone()).collect(),
            series: days.iter().map(|day| day.count).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

/// A chart in the shape the dashboard's charting library consumes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chart {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: &'static str,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

const COUNT_PALETTE: [&str; 6] = [
    "rgba(75, 192, 192, 0.6)",
    "rgba(54, 162, 235, 0.6)",
    "rgba(255, 206, 86, 0.6)",
    "rgba(255, 99, 132, 0.6)",
    "rgba(153, 102, 255, 0.6)",
    "rgba(255, 159, 64, 0.6)",
];

pub const COMMENTS_LINE: &str = "rgba(75, 192, 192, 1)";
pub const FEEDBACK_LINE: &str = "rgba(153, 102, 255, 1)";

/// Bar or pie chart of the system totals.
pub fn counts_chart(counts: &AggregateCounts, kind: ChartKind) -> Chart {
    let ChartData { labels, series } = counts.into();
    Chart {
        kind,
        title: match kind {
            ChartKind::Pie => "System Data Pie Chart",
            _ => "System Data Bar Chart",
        },
        labels,
        datasets: vec![Dataset {
            label: "Count",
            data: series,
            background_color: COUNT_PALETTE.to_vec(),
            border_color: None,
            fill: None,
            tension: None,
        }],
    }
}

/// Line chart of a per-day series.
pub fn daily_chart(title: &'static str, days: &[DailyCount], color: &'static str) -> Chart {
    let ChartData { labels, series } = days.into();
    Chart {
        kind: ChartKind::Line,
        title,
        labels,
        datasets: vec![Dataset {
            label: title,
            data: series,
            background_color: Vec::new(),
            border_color: Some(color),
            fill: Some(false),
            tension: Some(0.1),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_keep_fixed_label_order() {
        let counts = AggregateCounts {
            total_users: 6,
            total_research: 5,
            total_comments: 4,
            total_threads: 3,
            total_posts: 2,
            total_feedback: 1,
        };
        let data = ChartData::from(&counts);
        assert_eq!(
            data.labels,
            vec!["Users", "Research", "Comments", "Threads", "Posts", "Feedback"]
        );
        assert_eq!(data.series, vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_daily_preserves_input_order() {
        let days = [
            DailyCount {
                date: "2024-07-02".into(),
                count: 1,
            },
            DailyCount {
                date: "2024-07-01".into(),
                count: 9,
            },
        ];
        let data = ChartData::from(&days[..]);
        assert_eq!(data.labels, vec!["2024-07-02", "2024-07-01"]);
        assert_eq!(data.series, vec![1, 9]);
    }

    #[test]
    fn test_chart_json_shape() {
        let chart = daily_chart("Comments per Day", &[], COMMENTS_LINE);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["datasets"][0]["borderColor"], COMMENTS_LINE);
        assert_eq!(json["datasets"][0]["fill"], false);
        assert!(json["datasets"][0].get("backgroundColor").is_none());

        let pie = counts_chart(&AggregateCounts::default(), ChartKind::Pie);
        assert_eq!(pie.title, "System Data Pie Chart");
        assert_eq!(pie.datasets[0].background_color.len(), 6);
    }
}
