//! Domain records served by the admin API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use derive_debug::Dbg;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier. The API serves ids as numbers, some deployments as strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Unsigned(u64),
            String(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Integer(i) => Self(i.to_string()),
            Raw::Unsigned(u) => Self(u.to_string()),
            Raw::String(s) => Self(s),
        })
    }
}

pub type ResearchId = Identifier;
pub type ExpertId = Identifier;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Expert {
    #[serde(rename = "userID")]
    pub id: ExpertId,
    #[serde(default)]
    pub name: String,
}

/// Base64 image attached to a research record.
///
/// The payload stays encoded until a document needs it, so a corrupt image only
/// fails the page it belongs to.
#[derive(Clone, Dbg, PartialEq, Deserialize)]
pub struct Image {
    #[serde(rename = "image")]
    #[dbg(skip)]
    pub payload: String,
}

impl Image {
    pub fn decode_payload(&self) -> Result<Vec<u8>, base64::DecodeError> {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.decode(self.payload.trim())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRecord {
    #[serde(rename = "researchID")]
    pub id: ResearchId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "deserialize_published")]
    pub date_published: Option<Published>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// HTML rich text.
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub feedbacks: Vec<Feedback>,
}

impl ResearchRecord {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Publication timestamp as served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Published {
    /// A point in time, shown in the viewer's timezone.
    At(DateTime<Utc>),
    /// Date and time without an offset, shown as-is.
    WallClock(NaiveDateTime),
}

/// Parse the publication timestamp leniently.
///
/// Values with an offset and bare dates (UTC midnight) are instants; a date
/// and time without an offset is wall-clock time.
pub fn parse_published(s: &str) -> Option<Published> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Published::At(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Published::WallClock(naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Published::At(naive.and_utc()));
    }
    None
}

fn deserialize_published<'de, D>(deserializer: D) -> Result<Option<Published>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => {
            let parsed = parse_published(&s);
            if parsed.is_none() {
                tracing::debug!(value = %s, "unrecognized publication date");
            }
            parsed
        }
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Published::At),
        _ => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of system-wide totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCounts {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_research: u64,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub total_threads: u64,
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default)]
    pub total_feedback: u64,
}

impl AggregateCounts {
    pub const LABELS: [&'static str; 6] =
        ["Users", "Research", "Comments", "Threads", "Posts", "Feedback"];

    /// Totals in the order of [`Self::LABELS`].
    pub fn values(&self) -> [u64; 6] {
        [
            self.total_users,
            self.total_research,
            self.total_comments,
            self.total_threads,
            self.total_posts,
            self.total_feedback,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyCount {
    pub date: String,
    #[serde(default)]
    pub count: u64,
}
