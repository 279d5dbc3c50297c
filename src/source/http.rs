use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::DataSource;
use crate::model::{AggregateCounts, DailyCount, Expert, ExpertId, ResearchRecord};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    #[error("request failed. status: {status}, body: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid endpoint {path}: {error}")]
    Url {
        path: String,
        error: url::ParseError,
    },
    #[error("base url {0} cannot take path segments")]
    NotABase(Url),
}

/// REST backend of the admin pages.
pub struct Client {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl Client {
    pub fn new(mut base: Url, token: Option<String>) -> Self {
        // Url::join drops the last segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base.join(path).map_err(|error| Error::Url {
            path: path.to_owned(),
            error,
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Url) -> Result<T, Error> {
        debug!(%endpoint, "GET");
        let mut request = self.client.get(endpoint);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(Error::Transport)?;
            return Err(Error::Status { status, body });
        }
        response.json::<T>().await.map_err(Error::Transport)
    }

    /// The expert id is one percent-encoded path segment.
    fn research_endpoint(&self, expert: &ExpertId) -> Result<Url, Error> {
        let mut endpoint = self.endpoint("admin/research/expert/")?;
        endpoint
            .path_segments_mut()
            .map_err(|()| Error::NotABase(self.base.clone()))?
            .pop_if_empty()
            .push(expert.as_str());
        Ok(endpoint)
    }

    fn daily_endpoint(&self, kind: &str, date: Option<NaiveDate>) -> Result<Url, Error> {
        match date {
            None => self.endpoint(&format!("report/{kind}-per-day")),
            Some(date) => {
                let mut endpoint = self.endpoint(&format!("report/{kind}-by-date"))?;
                endpoint
                    .query_pairs_mut()
                    .append_pair("date", &date.format("%Y-%m-%d").to_string());
                Ok(endpoint)
            }
        }
    }
}

impl DataSource for Client {
    type Error = Error;

    async fn list_experts(&self) -> Result<Vec<Expert>, Self::Error> {
        self.get(self.endpoint("admin/experts")?).await
    }

    async fn list_research_by_expert(
        &self,
        expert: &ExpertId,
    ) -> Result<Vec<ResearchRecord>, Self::Error> {
        self.get(self.research_endpoint(expert)?).await
    }

    async fn aggregate_counts(&self) -> Result<AggregateCounts, Self::Error> {
        self.get(self.endpoint("admin/report")?).await
    }

    async fn daily_comment_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>, Self::Error> {
        self.get(self.daily_endpoint("comments", date)?).await
    }

    async fn daily_feedback_counts(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>, Self::Error> {
        self.get(self.daily_endpoint("feedback", date)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::new(base.parse().unwrap(), None)
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let client = client("https://example.com/api");
        assert_eq!(
            client.endpoint("admin/experts").unwrap().as_str(),
            "https://example.com/api/admin/experts"
        );
        assert_eq!(
            client.endpoint("admin/research/expert/12").unwrap().as_str(),
            "https://example.com/api/admin/research/expert/12"
        );
    }

    #[test]
    fn test_expert_id_stays_in_one_segment() {
        let client = client("https://example.com/api");
        assert_eq!(
            client
                .research_endpoint(&ExpertId::new("12"))
                .unwrap()
                .as_str(),
            "https://example.com/api/admin/research/expert/12"
        );
        let endpoint = client
            .research_endpoint(&ExpertId::new("../x?y#z"))
            .unwrap();
        assert_eq!(endpoint.path(), "/api/admin/research/expert/..%2Fx%3Fy%23z");
        assert_eq!(endpoint.query(), None);
        assert_eq!(endpoint.fragment(), None);
    }

    #[test]
    fn test_daily_endpoints() {
        let client = client("http://localhost:8080/");
        assert_eq!(
            client.daily_endpoint("comments", None).unwrap().as_str(),
            "http://localhost:8080/report/comments-per-day"
        );
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            client.daily_endpoint("feedback", Some(date)).unwrap().as_str(),
            "http://localhost:8080/report/feedback-by-date?date=2024-07-01"
        );
    }
}
