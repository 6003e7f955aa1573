use crate::error::{PropsError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BOVADA_COUPON_BASE: &str =
    "https://www.bovada.lv/services/sports/event/coupon/events/A/description/football";

pub const DEFAULT_OUTPUT: &str = "csv/props.csv";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DEADLINE_SECS: u64 = 120;

/// Super Bowl LV coupon pages: (label, path below the football coupon base)
const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    (
        "Game Props + Lines",
        "super-bowl/kansas-city-chiefs-tampa-bay-buccaneers-202102071830?lang=en",
    ),
    (
        "Specials",
        "super-bowl-specials?marketFilterId=rank&preMatchOnly=true&lang=en",
    ),
    (
        "TDs and FGs",
        "super-bowl-touchdown-and-field-goal-propositions/td-fg-propositions-super-bowl-55-202102071830?lang=en",
    ),
    (
        "Defense and Special Teams",
        "super-bowl-defense-and-special-team-propositions/defense-sp-team-props-super-bowl-55-202102071830?lang=en",
    ),
    (
        "Receiving Props",
        "super-bowl-receiving-propositions/receiving-propositions-super-bowl-55-202102071830?lang=en",
    ),
    (
        "Rushing Props",
        "super-bowl-rushing-propositions/rushing-propositions-super-bowl-55-202102071830?lang=en",
    ),
    (
        "QB Props",
        "super-bowl-quarterback-propositions/quarterback-props-super-bowl-55-202102071830?lang=en",
    ),
];

/// A props endpoint to fetch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Endpoint {
    pub label: String,
    pub url: String,
}

impl Endpoint {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Endpoint with no human label, named after its URL
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            label: url.clone(),
            url,
        }
    }
}

pub fn default_endpoints() -> Vec<Endpoint> {
    DEFAULT_ENDPOINTS
        .iter()
        .map(|(label, path)| Endpoint::new(*label, format!("{}/{}", BOVADA_COUPON_BASE, path)))
        .collect()
}

/// Everything one export run needs
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub endpoints: Vec<Endpoint>,
    pub output: PathBuf,
    /// Drop markets with no outcomes (Bovada redirect placeholders)
    pub skip_placeholders: bool,
    pub include_points: bool,
    pub request_timeout: Duration,
    pub overall_deadline: Duration,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            skip_placeholders: true,
            include_points: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            overall_deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
            cache_dir: None,
            use_cache: false,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(PropsError::Config("no endpoints configured".to_string()));
        }

        for endpoint in &self.endpoints {
            let url = reqwest::Url::parse(&endpoint.url).map_err(|e| {
                PropsError::Config(format!(
                    "endpoint '{}' has an invalid URL: {}",
                    endpoint.label, e
                ))
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(PropsError::Config(format!(
                    "endpoint '{}' must use http or https, got {}",
                    endpoint.label,
                    url.scheme()
                )));
            }
        }

        if self.request_timeout.is_zero() || self.overall_deadline.is_zero() {
            return Err(PropsError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        if self.use_cache && self.cache_dir.is_none() {
            return Err(PropsError::Config(
                "use_cache requires a cache directory".to_string(),
            ));
        }

        Ok(())
    }
}

/// On-disk TOML layout; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    pub output: Option<PathBuf>,
    pub skip_placeholders: Option<bool>,
    pub include_points: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub overall_deadline_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PropsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| PropsError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Lay the file's settings over `base`
    pub fn apply(self, mut base: ExportConfig) -> ExportConfig {
        if !self.endpoints.is_empty() {
            base.endpoints = self.endpoints;
        }
        if let Some(output) = self.output {
            base.output = output;
        }
        if let Some(skip) = self.skip_placeholders {
            base.skip_placeholders = skip;
        }
        if let Some(points) = self.include_points {
            base.include_points = points;
        }
        if let Some(secs) = self.request_timeout_secs {
            base.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.overall_deadline_secs {
            base.overall_deadline = Duration::from_secs(secs);
        }
        if self.cache_dir.is_some() {
            base.cache_dir = self.cache_dir;
        }
        base
    }
}
