use std::{collections::HashMap, path::Path, time::Duration};

use chrono::{NaiveDate, TimeZone, Utc};
use futures::{StreamExt, future::join_all, stream::FuturesUnordered};
use serde::Deserialize;

use crate::{
    config::Config,
    model::{AggregateCounts, DailyCount, Expert, ExpertId, Identifier, ResearchRecord},
    report::{Generator, Metadata, Warning},
    source::DataSource,
    view::{
        ExpertView, MetricsView,
        expert::{self, Message},
        metrics::{self, Message as MetricsMessage},
    },
};

const SCENARIO: &str = "src/tests/scenario";

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(String);

#[derive(Deserialize)]
struct Daily {
    comments: Vec<DailyCount>,
    feedback: Vec<DailyCount>,
    counts: AggregateCounts,
}

/// Serves the scenario fixtures, optionally slowed down per expert.
struct FakeSource {
    experts: Vec<Expert>,
    research: HashMap<String, Vec<ResearchRecord>>,
    daily: Daily,
    delays: HashMap<String, Duration>,
    feedback_down: bool,
}

async fn fixture<T: for<'de> Deserialize<'de>>(name: &str) -> T {
    let src = tokio::fs::read_to_string(Path::new(SCENARIO).join(name))
        .await
        .unwrap();
    serde_json::from_str(&src).unwrap()
}

impl FakeSource {
    async fn load() -> Self {
        Self {
            experts: fixture("experts.json").await,
            research: fixture("research.json").await,
            daily: fixture("daily.json").await,
            delays: HashMap::new(),
            feedback_down: false,
        }
    }

    fn with_delay(mut self, expert: &str, delay: Duration) -> Self {
        self.delays.insert(expert.to_owned(), delay);
        self
    }
}

impl DataSource for FakeSource {
    type Error = FakeError;

    async fn list_experts(&self) -> Result<Vec<Expert>, Self::Error> {
        Ok(self.experts.clone())
    }

    async fn list_research_by_expert(
        &self,
        expert: &ExpertId,
    ) -> Result<Vec<ResearchRecord>, Self::Error> {
        if let Some(delay) = self.delays.get(expert.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.research
            .get(expert.as_str())
            .cloned()
            .ok_or_else(|| FakeError(format!("no such expert: {expert}")))
    }

    async fn aggregate_counts(&self) -> Result<AggregateCounts, Self::Error> {
        Ok(self.daily.counts)
    }

    async fn daily_comment_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>, Self::Error> {
        Ok(filter(&self.daily.comments, date))
    }

    async fn daily_feedback_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>, Self::Error> {
        if self.feedback_down {
            return Err(FakeError("feedback service unavailable".into()));
        }
        Ok(filter(&self.daily.feedback, date))
    }
}

fn filter(days: &[DailyCount], date: Option<NaiveDate>) -> Vec<DailyCount> {
    let Some(date) = date else {
        return days.to_vec();
    };
    let date = date.format("%Y-%m-%d").to_string();
    days.iter().filter(|day| day.date == date).cloned().collect()
}

async fn config() -> Config {
    Config::load(&Path::new(SCENARIO).join("config.yaml"))
        .await
        .unwrap()
}

fn metadata(config: &Config) -> Metadata {
    Metadata {
        generated_by: config.operator.clone(),
        generated_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_expert_report_from_scenario() {
    let config = config().await;
    let template = config.template().await.unwrap();
    let source = FakeSource::load().await;

    let mut view = ExpertView::new();
    let command = view.update(Message::Init).unwrap();
    let loaded = expert::execute(&source, command).await;
    assert!(view.update(loaded).is_none());
    assert_eq!(view.experts.len(), 2);

    let first = view.experts[0].id.clone();
    let command = view.update(Message::SelectExpert(first)).unwrap();
    assert!(view.loading);
    let loaded = expert::execute(&source, command).await;
    view.update(loaded);
    assert!(!view.loading);
    assert_eq!(view.records.len(), 2);

    let doc = view.export(&Generator::new(&template), &metadata(&config));
    // Summary page, one decodable image, one feedback item.
    assert_eq!(doc.page_count, 3);
    assert_eq!(doc.warnings.len(), 1);
    assert!(matches!(
        &doc.warnings[0],
        Warning::UndecodableImage { research_id, index: 2, .. } if research_id == &Identifier::from(101)
    ));

    let dir = std::env::temp_dir().join("admin-reports-expert-scenario");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = doc.save(&dir).await.unwrap();
    assert!(path.ends_with("expert_research_reports.pdf"));
    let written = tokio::fs::read(&path).await.unwrap();
    assert!(written.starts_with(b"%PDF-1.4"));
    assert!(written.ends_with(b"%%EOF\n"));
}

#[tokio::test]
async fn test_slow_response_for_previous_expert_does_not_win() {
    let source = FakeSource::load()
        .await
        .with_delay("E1", Duration::from_millis(150));
    let mut view = ExpertView::new();

    let mut in_flight = FuturesUnordered::new();
    for expert in ["E1", "E2"] {
        let command = view
            .update(Message::SelectExpert(Identifier::new(expert)))
            .unwrap();
        in_flight.push(expert::execute(&source, command));
    }

    let mut arrival = Vec::new();
    while let Some(message) = in_flight.next().await {
        if let Message::ResearchLoaded { token, .. } = &message {
            arrival.push(*token);
        }
        view.update(message);
    }

    // E2 was requested last but answered first.
    assert_eq!(arrival.len(), 2);
    assert!(arrival[0] > arrival[1]);
    assert_eq!(view.selected, Some(Identifier::new("E2")));
    assert_eq!(view.records, source.research["E2"]);
    assert!(!view.loading);
}

#[tokio::test]
async fn test_metrics_dashboard_flow() {
    let config = config().await;
    let template = config.template().await.unwrap();
    let generator = Generator::new(&template);
    let mut source = FakeSource::load().await;
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    let mut view = MetricsView::new(today);
    let commands = view.update(MetricsMessage::Init);
    for message in join_all(commands.into_iter().map(|c| metrics::execute(&source, c))).await {
        view.update(message);
    }
    assert!(!view.loading());
    assert_eq!(view.counts.map(|c| c.total_comments), Some(130));
    assert_eq!(view.daily.comments.len(), 2);
    assert_eq!(view.charts().len(), 4);

    let system = view.export_system(&generator, &metadata(&config)).unwrap();
    assert_eq!(system.file_name, "system_report.pdf");

    // Both series must load for a date pick to take effect.
    source.feedback_down = true;
    for command in view.update(MetricsMessage::PickDate(today)) {
        let message = metrics::execute(&source, command).await;
        view.update(message);
    }
    assert!(!view.loading());
    assert_eq!(view.daily_error.as_deref(), Some("feedback service unavailable"));
    assert_eq!(view.counts_error, None);
    assert_eq!(view.daily.comments.len(), 2);

    source.feedback_down = false;
    for command in view.update(MetricsMessage::PickDate(today)) {
        let message = metrics::execute(&source, command).await;
        view.update(message);
    }
    assert!(view.error().is_none());
    assert_eq!(view.daily.comments.len(), 1);
    assert_eq!(view.daily.feedback.len(), 1);

    let activity = view.export_activity(&generator, &metadata(&config));
    assert_eq!(activity.file_name, "comments_feedback_report_7-1-2024.pdf");
    assert_eq!(activity.page_count, 2);
}
