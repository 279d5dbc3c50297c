use chrono::NaiveDate;
use tracing::debug;

use super::{ExportError, RequestToken, TokenIssuer};
use crate::{
    chart::{COMMENTS_LINE, Chart, ChartKind, FEEDBACK_LINE, counts_chart, daily_chart},
    model::{AggregateCounts, DailyCount},
    report::{Document, Generator, Metadata},
    source::DataSource,
};

/// Comment and feedback series fetched together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailySeries {
    pub comments: Vec<DailyCount>,
    pub feedback: Vec<DailyCount>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Init,
    CountsLoaded {
        token: RequestToken,
        result: Result<AggregateCounts, String>,
    },
    PickDate(NaiveDate),
    DailyLoaded {
        token: RequestToken,
        result: Result<DailySeries, String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    FetchCounts {
        token: RequestToken,
    },
    /// `date: None` asks for the unfiltered per-day series.
    FetchDaily {
        token: RequestToken,
        date: Option<NaiveDate>,
    },
}

/// System metrics dashboard state.
#[derive(Debug)]
pub struct MetricsView {
    pub counts: Option<AggregateCounts>,
    pub daily: DailySeries,
    pub selected_date: NaiveDate,
    pub counts_error: Option<String>,
    pub daily_error: Option<String>,
    counts_token: TokenIssuer,
    daily_token: TokenIssuer,
    counts_pending: bool,
    daily_pending: bool,
}

impl MetricsView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            counts: None,
            daily: DailySeries::default(),
            selected_date: today,
            counts_error: None,
            daily_error: None,
            counts_token: TokenIssuer::default(),
            daily_token: TokenIssuer::default(),
            counts_pending: false,
            daily_pending: false,
        }
    }

    pub fn loading(&self) -> bool {
        self.counts_pending || self.daily_pending
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Init => {
                self.counts_error = None;
                self.daily_error = None;
                self.counts_pending = true;
                self.daily_pending = true;
                vec![
                    Command::FetchCounts {
                        token: self.counts_token.issue(),
                    },
                    Command::FetchDaily {
                        token: self.daily_token.issue(),
                        date: None,
                    },
                ]
            }
            Message::CountsLoaded { token, result } => {
                if !self.counts_token.is_current(token) {
                    debug!(%token, "dropping stale counts response");
                    return Vec::new();
                }
                self.counts_pending = false;
                match result {
                    Ok(counts) => self.counts = Some(counts),
                    Err(error) => self.counts_error = Some(error),
                }
                Vec::new()
            }
            Message::PickDate(date) => {
                self.selected_date = date;
                self.daily_pending = true;
                self.daily_error = None;
                vec![Command::FetchDaily {
                    token: self.daily_token.issue(),
                    date: Some(date),
                }]
            }
            Message::DailyLoaded { token, result } => {
                if !self.daily_token.is_current(token) {
                    debug!(%token, "dropping stale daily response");
                    return Vec::new();
                }
                self.daily_pending = false;
                match result {
                    Ok(daily) => self.daily = daily,
                    Err(error) => self.daily_error = Some(error),
                }
                Vec::new()
            }
        }
    }

    /// The first outstanding failure, counts before the daily series.
    pub fn error(&self) -> Option<&str> {
        self.counts_error.as_deref().or(self.daily_error.as_deref())
    }

    /// Bar and pie charts of the totals once loaded, then the two daily lines.
    pub fn charts(&self) -> Vec<Chart> {
        let mut charts = Vec::with_capacity(4);
        if let Some(counts) = &self.counts {
            charts.push(counts_chart(counts, ChartKind::Bar));
            charts.push(counts_chart(counts, ChartKind::Pie));
        }
        charts.push(daily_chart(
            "Comments per Day",
            &self.daily.comments,
            COMMENTS_LINE,
        ));
        charts.push(daily_chart(
            "Feedback per Day",
            &self.daily.feedback,
            FEEDBACK_LINE,
        ));
        charts
    }

    pub fn export_system(
        &self,
        generator: &Generator<'_>,
        metadata: &Metadata,
    ) -> Result<Document, ExportError> {
        let counts = self.counts.as_ref().ok_or(ExportError::NotLoaded("counts"))?;
        Ok(generator.system(counts, metadata))
    }

    pub fn export_activity(&self, generator: &Generator<'_>, metadata: &Metadata) -> Document {
        generator.activity(
            &self.daily.comments,
            &self.daily.feedback,
            self.selected_date,
            metadata,
        )
    }
}

/// Run `command` against `source`. Both daily series must load for the
/// pair to be accepted.
pub async fn execute<S: DataSource>(source: &S, command: Command) -> Message {
    match command {
        Command::FetchCounts { token } => Message::CountsLoaded {
            token,
            result: source
                .aggregate_counts()
                .await
                .map_err(|error| error.to_string()),
        },
        Command::FetchDaily { token, date } => {
            let result = futures::try_join!(
                source.daily_comment_counts(date),
                source.daily_feedback_counts(date)
            )
            .map(|(comments, feedback)| DailySeries { comments, feedback })
            .map_err(|error| error.to_string());
            Message::DailyLoaded { token, result }
        }
    }
}
