//! Printable report documents.
//!
//! A [`Generator`] owns the fixed template (logo, locale, image budget) and
//! turns fetched records into a finished PDF [`Document`]. Persisting the
//! bytes is left to the caller.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    locale::Locale,
    model::ResearchId,
    pdf::{DecodeError, DocumentInfo, ImageId, PdfBuilder, RasterImage, Rgb},
};

mod activity;
mod expert;
pub mod layout;
mod system;
pub mod table;

pub use table::{SummaryTable, summary_table};

pub const FOREST_GREEN: Rgb = Rgb(34, 139, 34);
pub const HEADER_BLUE: Rgb = Rgb(41, 128, 185);

/// Default bound on images embedded in one document.
pub const DEFAULT_MAX_IMAGES: usize = 200;

/// The person a report is generated for.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Operator {
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "ROLE_ADMIN".to_owned()
}

impl Operator {
    pub fn role_label(&self) -> &'static str {
        if self.role == "ROLE_ADMIN" {
            "Admin"
        } else {
            "User"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub generated_by: Operator,
    pub generated_at: DateTime<Utc>,
}

impl Metadata {
    pub fn now(generated_by: Operator) -> Self {
        Self {
            generated_by,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrandingError {
    #[error("failed to read logo {path}: {error}")]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("failed to decode logo {path}: {error}")]
    Decode { path: PathBuf, error: DecodeError },
}

#[derive(Clone, Debug, Default)]
pub struct Branding {
    pub logo: Option<RasterImage>,
}

impl Branding {
    pub async fn load(logo: Option<&Path>) -> Result<Self, BrandingError> {
        let Some(path) = logo else {
            return Ok(Self::default());
        };
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|error| BrandingError::Read {
                path: path.to_owned(),
                error,
            })?;
        let logo = RasterImage::decode(&bytes).map_err(|error| BrandingError::Decode {
            path: path.to_owned(),
            error,
        })?;
        Ok(Self { logo: Some(logo) })
    }
}

/// Fixed parts shared by every generated document.
#[derive(Clone, Debug)]
pub struct Template {
    pub branding: Branding,
    pub locale: Locale,
    /// Upper bound on images embedded per document; `None` disables the bound.
    pub max_images: Option<usize>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            branding: Branding::default(),
            locale: Locale::default(),
            max_images: Some(DEFAULT_MAX_IMAGES),
        }
    }
}

/// A per-item problem that did not stop generation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("skipped image {index} of research {research_id}: {reason}")]
    UndecodableImage {
        research_id: ResearchId,
        /// 1-based position within the record.
        index: usize,
        reason: String,
    },
    #[error("image limit of {limit} reached, {skipped} image(s) left out")]
    ImageLimitReached { limit: usize, skipped: usize },
}

/// A finished document.
#[derive(Clone, Debug)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<Warning>,
}

impl Document {
    /// Write the document into `dir` under its file name.
    pub async fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

pub struct Generator<'t> {
    template: &'t Template,
}

impl<'t> Generator<'t> {
    pub fn new(template: &'t Template) -> Self {
        Self { template }
    }

    pub fn locale(&self) -> &Locale {
        &self.template.locale
    }

    fn start(&self) -> (PdfBuilder, Option<ImageId>) {
        let mut pdf = PdfBuilder::new();
        let logo = self
            .template
            .branding
            .logo
            .clone()
            .map(|logo| pdf.add_image(logo));
        (pdf, logo)
    }

    fn finish(
        &self,
        pdf: PdfBuilder,
        title: &str,
        file_name: String,
        metadata: &Metadata,
        warnings: Vec<Warning>,
    ) -> Document {
        let page_count = pdf.page_count();
        let bytes = pdf.finish(&DocumentInfo {
            title,
            created_at: metadata.generated_at,
        });
        tracing::debug!(file_name = %file_name, page_count, warnings = warnings.len(), "document generated");
        Document {
            file_name,
            bytes,
            page_count,
            warnings,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn metadata() -> Metadata {
        Metadata {
            generated_by: Operator {
                name: "admin TC".into(),
                role: "ROLE_ADMIN".into(),
            },
            generated_at: Utc.with_ymd_and_hms(2024, 7, 1, 14, 30, 0).unwrap(),
        }
    }

    pub(crate) fn template() -> Template {
        Template {
            locale: Locale::pinned(0),
            ..Default::default()
        }
    }

    pub(crate) fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle.as_bytes())
            .count()
    }

    #[test]
    fn test_role_label() {
        let mut operator = metadata().generated_by;
        assert_eq!(operator.role_label(), "Admin");
        operator.role = "ROLE_EXPERT".into();
        assert_eq!(operator.role_label(), "User");
    }

    #[tokio::test]
    async fn test_missing_logo_file_is_an_error() {
        let err = Branding::load(Some(Path::new("does/not/exist.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, BrandingError::Read { .. }));
        assert!(Branding::load(None).await.unwrap().logo.is_none());
    }
}
