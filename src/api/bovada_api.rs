use crate::config::Endpoint;
use crate::error::{PropsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One coupon response: a list of elements, each holding events
pub type BovadaApiResponse = Vec<BovadaListElement>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BovadaListElement {
    pub events: Vec<BovadaEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BovadaEvent {
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub display_groups: Vec<BovadaDisplayGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BovadaDisplayGroup {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub markets: Vec<BovadaMarket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BovadaMarket {
    pub description: String,
    #[serde(default)]
    pub description_key: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<BovadaOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BovadaOutcome {
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price: Option<BovadaPrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BovadaPrice {
    #[serde(default)]
    pub decimal: Option<TextOrNumber>,
    #[serde(default)]
    pub handicap: Option<TextOrNumber>,
}

/// Bovada sends prices as strings ("1.91"), but numbers show up too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(f64),
}

impl fmt::Display for TextOrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrNumber::Text(s) => f.write_str(s),
            TextOrNumber::Number(n) => write!(f, "{}", n),
        }
    }
}

pub struct BovadaClient {
    client: reqwest::Client,
}

impl BovadaClient {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| PropsError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET one endpoint and parse the body as a coupon response
    pub async fn fetch_response(&self, endpoint: &Endpoint) -> Result<BovadaApiResponse> {
        debug!("Fetching {} ({})", endpoint.label, endpoint.url);

        let response = self
            .client
            .get(&endpoint.url)
            .send()
            .await
            .map_err(|source| PropsError::Fetch {
                endpoint: endpoint.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PropsError::Status {
                endpoint: endpoint.url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| PropsError::Fetch {
            endpoint: endpoint.url.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| PropsError::Json {
            endpoint: endpoint.url.clone(),
            source,
        })
    }
}
