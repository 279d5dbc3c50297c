//! Calendar and clock conventions used when rendering dates.
//!
//! By default dates follow the viewer's local timezone, so the same data can
//! render differently on two machines. Pin `utc_offset_minutes` for
//! reproducible documents.

use std::fmt::Write as _;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, Utc,
    format::{Item, StrftimeItems},
};
use serde::Deserialize;

use crate::model::Published;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid {field} {pattern:?}")]
    Format {
        field: &'static str,
        pattern: String,
    },
    #[error("utc_offset_minutes {0} is outside -1439..=1439")]
    Offset(i32),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Locale {
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const TIME_FORMAT: &str = "%-I:%M:%S %p";

fn default_date_format() -> String {
    DATE_FORMAT.to_owned()
}

fn default_time_format() -> String {
    TIME_FORMAT.to_owned()
}

fn offset(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

/// Format with `pattern`, or with `fallback` when chrono rejects it.
fn render<'a, D: std::fmt::Display>(
    display: impl Fn(&'a str) -> D,
    pattern: &'a str,
    fallback: &'a str,
) -> String {
    let mut out = String::new();
    if write!(out, "{}", display(pattern)).is_ok() {
        return out;
    }
    tracing::warn!(pattern, "unrenderable date format, using default");
    display(fallback).to_string()
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            time_format: default_time_format(),
            utc_offset_minutes: None,
        }
    }
}

impl Locale {
    /// Locale pinned to a fixed offset from UTC.
    pub fn pinned(utc_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes: Some(utc_offset_minutes),
            ..Default::default()
        }
    }

    /// Reject formats chrono cannot render and offsets it cannot represent.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, pattern) in [
            ("date_format", &self.date_format),
            ("time_format", &self.time_format),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(Error::Format {
                    field,
                    pattern: pattern.clone(),
                });
            }
        }
        match self.utc_offset_minutes {
            Some(minutes) if offset(minutes).is_none() => Err(Error::Offset(minutes)),
            _ => Ok(()),
        }
    }

    fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes.and_then(offset)
    }

    fn render(&self, at: DateTime<Utc>, format: &str, fallback: &str) -> String {
        match self.offset() {
            Some(offset) => {
                let at = at.with_timezone(&offset);
                render(|f| at.format(f), format, fallback)
            }
            None => {
                let at = at.with_timezone(&Local);
                render(|f| at.format(f), format, fallback)
            }
        }
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        self.render(at, &self.date_format, DATE_FORMAT)
    }

    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        self.render(at, &self.time_format, TIME_FORMAT)
    }

    /// Calendar dates carry no timezone and are formatted as-is.
    pub fn format_naive_date(&self, date: NaiveDate) -> String {
        render(|f| date.format(f), &self.date_format, DATE_FORMAT)
    }

    /// Instants are shown in this locale's timezone, wall-clock values as served.
    pub fn format_published(&self, published: Published) -> String {
        match published {
            Published::At(at) => self.format_date(at),
            Published::WallClock(naive) => {
                render(|f| naive.format(f), &self.date_format, DATE_FORMAT)
            }
        }
    }

    /// Today's calendar date in this locale's timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.offset() {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.with_timezone(&Local).date_naive(),
        }
    }
}

/// Replace characters that cannot appear in a file name.
pub fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect()
}
