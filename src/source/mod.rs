//! Where the admin pages get their data from.

use chrono::NaiveDate;

use crate::model::{AggregateCounts, DailyCount, Expert, ExpertId, ResearchRecord};

pub mod http;

pub trait DataSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_experts(&self) -> impl Future<Output = Result<Vec<Expert>, Self::Error>> + Send;

    fn list_research_by_expert(
        &self,
        expert: &ExpertId,
    ) -> impl Future<Output = Result<Vec<ResearchRecord>, Self::Error>> + Send;

    fn aggregate_counts(&self) -> impl Future<Output = Result<AggregateCounts, Self::Error>> + Send;

    /// Per-day comment totals. With `date`, only that day is reported.
    fn daily_comment_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<DailyCount>, Self::Error>> + Send;

    /// Per-day feedback totals. With `date`, only that day is reported.
    fn daily_feedback_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<DailyCount>, Self::Error>> + Send;
}
