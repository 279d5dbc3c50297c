use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::{
    locale::{self, Locale},
    report::{Branding, BrandingError, DEFAULT_MAX_IMAGES, Operator, Template},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config {path}: {error}")]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("failed to parse config {path}: {error}")]
    Parse {
        path: PathBuf,
        error: serde_yaml::Error,
    },
    #[error("bad locale in config {path}: {error}")]
    Locale {
        path: PathBuf,
        error: locale::Error,
    },
}

#[derive(Deserialize, Clone, Debug)]
pub struct Api {
    pub base_url: Url,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct BrandingConfig {
    /// Image file printed in the top-left corner of every document.
    pub logo: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Limits {
    /// `null` lifts the bound.
    #[serde(default = "default_max_images")]
    pub max_images: Option<usize>,
}

fn default_max_images() -> Option<usize> {
    Some(DEFAULT_MAX_IMAGES)
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub api: Api,
    pub operator: Operator,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn parse(src: &str, path: &Path) -> Result<Self, Error> {
        let mut config: Config = serde_yaml::from_str(src).map_err(|error| Error::Parse {
            path: path.to_owned(),
            error,
        })?;
        config.locale.validate().map_err(|error| Error::Locale {
            path: path.to_owned(),
            error,
        })?;
        // Relative paths in the file are relative to the file itself.
        if let Some(base) = path.parent() {
            if let Some(logo) = &mut config.branding.logo {
                *logo = base.join(&*logo);
            }
            config.output_dir = base.join(&config.output_dir);
        }
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self, Error> {
        let src = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| Error::Read {
                path: path.to_owned(),
                error,
            })?;
        Self::parse(&src, path)
    }

    pub async fn template(&self) -> Result<Template, BrandingError> {
        Ok(Template {
            branding: Branding::load(self.branding.logo.as_deref()).await?,
            locale: self.locale.clone(),
            max_images: self.limits.max_images,
        })
    }
}
