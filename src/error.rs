use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything that can abort an export run
#[derive(Debug, Error)]
pub enum PropsError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {endpoint} failed: {source}")]
    Fetch {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {endpoint} is not a valid props document: {source}")]
    Json {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "bad odds {value:?} for outcome '{outcome}' in market '{market}' of event '{event}' ({endpoint})"
    )]
    Odds {
        endpoint: String,
        event: String,
        market: String,
        outcome: String,
        value: Option<String>,
    },

    #[error("fetching endpoints did not finish within {limit:?}")]
    Deadline { limit: Duration },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PropsError>;
