pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use config::*;
pub use error::{PropsError, Result};
pub use models::*;
pub use utils::*;

use futures::future::try_join_all;
use std::path::PathBuf;
use tracing::{info, warn};

/// What a finished export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub endpoints: usize,
    pub bets: usize,
    pub skipped_placeholders: usize,
    pub max_outcomes: usize,
    pub output: PathBuf,
}

/// Fetch every endpoint, flatten the props into bets and write them as CSV.
///
/// Nothing is written unless every endpoint was fetched and every bet
/// parsed.
pub async fn build_props_csv(config: &ExportConfig) -> Result<ExportSummary> {
    config.validate()?;

    let client = BovadaClient::new(config.request_timeout)?;
    let responses = gather_responses(&client, config).await?;

    // Flatten in endpoint order
    let mut bets = Vec::new();
    let mut skipped_placeholders = 0;
    for (endpoint, response) in config.endpoints.iter().zip(&responses) {
        let flattened = flatten_response(response, &endpoint.url, config.skip_placeholders)?;
        info!(
            "{}: {} bets ({} placeholders skipped)",
            endpoint.label,
            flattened.bets.len(),
            flattened.skipped_placeholders
        );
        skipped_placeholders += flattened.skipped_placeholders;
        bets.extend(flattened.bets);
    }

    let csv = render_csv(&bets, config.include_points)?;
    write_output(&config.output, &csv).await?;
    info!("Wrote {} bets to {}", bets.len(), config.output.display());

    Ok(ExportSummary {
        endpoints: config.endpoints.len(),
        bets: bets.len(),
        skipped_placeholders,
        max_outcomes: max_outcomes(&bets),
        output: config.output.clone(),
    })
}

/// Fetch all endpoints concurrently. Results come back in endpoint order;
/// the first failure aborts the rest.
async fn gather_responses(
    client: &BovadaClient,
    config: &ExportConfig,
) -> Result<Vec<BovadaApiResponse>> {
    let fetches = config
        .endpoints
        .iter()
        .enumerate()
        .map(|(index, endpoint)| load_or_fetch(client, config, index, endpoint));

    tokio::time::timeout(config.overall_deadline, try_join_all(fetches))
        .await
        .map_err(|_| PropsError::Deadline {
            limit: config.overall_deadline,
        })?
}

async fn load_or_fetch(
    client: &BovadaClient,
    config: &ExportConfig,
    index: usize,
    endpoint: &Endpoint,
) -> Result<BovadaApiResponse> {
    let Some(cache_dir) = &config.cache_dir else {
        return client.fetch_response(endpoint).await;
    };

    let cache_file = cache_file_path(cache_dir, index, endpoint);
    if config.use_cache {
        let cached = tokio::fs::try_exists(&cache_file)
            .await
            .map_err(|source| PropsError::Io {
                path: cache_file.clone(),
                source,
            })?;
        if cached {
            info!(
                "Loading {} from cache file: {}",
                endpoint.label,
                cache_file.display()
            );
            return load_response_from_cache(&cache_file).await;
        }
        warn!(
            "No cache file for {} at {}, fetching",
            endpoint.label,
            cache_file.display()
        );
    }

    let response = client.fetch_response(endpoint).await?;
    save_response_to_cache(&response, &cache_file).await?;
    info!(
        "Saved {} to cache file: {}",
        endpoint.label,
        cache_file.display()
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::time::Duration;

    const GAME: &str = r#"[{"events": [{
        "description": "Team A vs Team B",
        "displayGroups": [{
            "description": "Game Lines",
            "markets": [
                {"description": "Moneyline", "outcomes": [
                    {"description": "Team A", "price": {"decimal": "1.91"}},
                    {"description": "Team B", "price": {"decimal": "1.91"}}
                ]},
                {"description": "Point Spread", "outcomes": [
                    {"description": "Team A", "price": {"decimal": "1.91", "handicap": "+3.5"}},
                    {"description": "Team B", "price": {"decimal": "1.91", "handicap": "-3.5"}}
                ]},
                {"description": "See Specials", "outcomes": []}
            ]
        }]
    }]}]"#;

    const SPECIALS: &str = r#"[{"events": [{
        "description": "Super Bowl Specials",
        "displayGroups": [{
            "markets": [
                {"description": "Gatorade Color", "outcomes": [
                    {"description": "Orange", "price": {"decimal": "3.5"}},
                    {"description": "Yellow, Lime or Green", "price": {"decimal": "4.0"}},
                    {"description": "Blue", "price": {"decimal": "5.0"}}
                ]}
            ]
        }]
    }]}]"#;

    const BAD_ODDS: &str = r#"[{"events": [{
        "description": "Team A vs Team B",
        "displayGroups": [{"markets": [
            {"description": "MVP", "outcomes": [{"description": "QB", "price": {"decimal": "N/A"}}]}
        ]}]
    }]}]"#;

    async fn serve() -> SocketAddr {
        let app = Router::new()
            .route(
                "/game",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], GAME) }),
            )
            .route(
                "/specials",
                get(|| async {
                    // Finishes after /game so ordering can't come from arrival
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    ([(header::CONTENT_TYPE, "application/json")], SPECIALS)
                }),
            )
            .route(
                "/bad-odds",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], BAD_ODDS) }),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/garbage", get(|| async { "<html>not json</html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "[]"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn config_for(addr: SocketAddr, paths: &[&str], output: &Path) -> ExportConfig {
        ExportConfig {
            endpoints: paths
                .iter()
                .map(|path| Endpoint::new(*path, format!("http://{}/{}", addr, path)))
                .collect(),
            output: output.to_path_buf(),
            request_timeout: Duration::from_secs(2),
            overall_deadline: Duration::from_secs(10),
            ..ExportConfig::default()
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap()
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_export_keeps_endpoint_order() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("csv").join("props.csv");

        let summary = build_props_csv(&config_for(addr, &["specials", "game"], &output))
            .await
            .unwrap();

        assert_eq!(
            summary,
            ExportSummary {
                endpoints: 2,
                bets: 3,
                skipped_placeholders: 1,
                max_outcomes: 3,
                output: output.clone(),
            }
        );

        let rows = read_rows(&output);
        assert_eq!(
            rows,
            vec![
                vec!["Event", "Bet", "Bet Side", "Bet Side", "Bet Side"],
                vec![
                    "Super Bowl Specials",
                    "Gatorade Color",
                    "Orange $$odds=3.5 $$points=71",
                    "Yellow, Lime or Green $$odds=4 $$points=75",
                    "Blue $$odds=5 $$points=80",
                ],
                vec![
                    "Team A vs Team B",
                    "Moneyline",
                    "Team A $$odds=1.91 $$points=48",
                    "Team B $$odds=1.91 $$points=48",
                    "",
                ],
                vec![
                    "Team A vs Team B",
                    "Point Spread $$number=+3.5",
                    "Team A $$line={+3.5} $$odds=1.91 $$points=48",
                    "Team B $$line={-3.5} $$odds=1.91 $$points=48",
                    "",
                ],
            ]
        );
    }

    #[tokio::test]
    async fn test_export_can_keep_placeholders() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");

        let config = ExportConfig {
            skip_placeholders: false,
            include_points: false,
            ..config_for(addr, &["game"], &output)
        };
        let summary = build_props_csv(&config).await.unwrap();
        assert_eq!(summary.bets, 3);
        assert_eq!(summary.skipped_placeholders, 0);

        let rows = read_rows(&output);
        assert_eq!(rows[1][2], "Team A $$odds=1.91");
        assert_eq!(rows[3], vec!["Team A vs Team B", "See Specials", "", ""]);
    }

    #[tokio::test]
    async fn test_http_500_fails_whole_run() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");

        match build_props_csv(&config_for(addr, &["game", "broken"], &output)).await {
            Err(PropsError::Status { endpoint, status }) => {
                assert_eq!(endpoint, format!("http://{}/broken", addr));
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_failed_run_leaves_previous_output_alone() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");
        std::fs::write(&output, "previous export").unwrap();

        let result = build_props_csv(&config_for(addr, &["game", "bad-odds"], &output)).await;
        match result {
            Err(PropsError::Odds {
                endpoint,
                market,
                value,
                ..
            }) => {
                assert!(endpoint.ends_with("/bad-odds"));
                assert_eq!(market, "MVP");
                assert_eq!(value.as_deref(), Some("N/A"));
            }
            other => panic!("expected odds error, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous export");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");

        let result = build_props_csv(&config_for(addr, &["garbage"], &output)).await;
        assert!(matches!(
            result,
            Err(PropsError::Json { endpoint, .. }) if endpoint.ends_with("/garbage")
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");

        let config = ExportConfig {
            request_timeout: Duration::from_millis(100),
            ..config_for(addr, &["game", "slow"], &output)
        };
        match build_props_csv(&config).await {
            Err(PropsError::Fetch { endpoint, source }) => {
                assert!(endpoint.ends_with("/slow"));
                assert!(source.is_timeout());
            }
            other => panic!("expected fetch timeout, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_overall_deadline() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("props.csv");

        let config = ExportConfig {
            request_timeout: Duration::from_secs(30),
            overall_deadline: Duration::from_millis(200),
            ..config_for(addr, &["slow"], &output)
        };
        match build_props_csv(&config).await {
            Err(err @ PropsError::Deadline { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "fetching endpoints did not finish within 200ms"
                );
            }
            other => panic!("expected deadline error, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_cached_responses_replace_fetches() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let first_output = dir.path().join("first.csv");
        let second_output = dir.path().join("second.csv");

        let config = ExportConfig {
            cache_dir: Some(cache_dir.clone()),
            ..config_for(addr, &["game"], &first_output)
        };
        build_props_csv(&config).await.unwrap();
        assert!(cache_dir.join("00-game.json").exists());

        // Same label, but the URL now fails; the cache must answer instead
        let cached = ExportConfig {
            endpoints: vec![Endpoint::new("game", format!("http://{}/broken", addr))],
            output: second_output.clone(),
            use_cache: true,
            ..config
        };
        let summary = build_props_csv(&cached).await.unwrap();
        assert_eq!(summary.bets, 2);
        assert_eq!(
            std::fs::read_to_string(&first_output).unwrap(),
            std::fs::read_to_string(&second_output).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_saves() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir(&cache_dir).unwrap();
        let output = dir.path().join("props.csv");

        let config = ExportConfig {
            cache_dir: Some(cache_dir.clone()),
            use_cache: true,
            ..config_for(addr, &["game"], &output)
        };
        let summary = build_props_csv(&config).await.unwrap();
        assert_eq!(summary.bets, 2);

        let cached = load_response_from_cache(&cache_dir.join("00-game.json"))
            .await
            .unwrap();
        let fetched: BovadaApiResponse = serde_json::from_str(GAME).unwrap();
        assert_eq!(cached, fetched);
    }

    #[tokio::test]
    async fn test_unusable_cache_dir_is_io_error() {
        let addr = serve().await;
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the cache directory should be
        let cache_dir = dir.path().join("cache");
        std::fs::write(&cache_dir, "not a directory").unwrap();
        let output = dir.path().join("props.csv");

        for use_cache in [false, true] {
            let config = ExportConfig {
                cache_dir: Some(cache_dir.clone()),
                use_cache,
                ..config_for(addr, &["game"], &output)
            };
            match build_props_csv(&config).await {
                Err(PropsError::Io { path, .. }) => {
                    assert_eq!(path, cache_dir.join("00-game.json"));
                }
                other => panic!("expected io error (use_cache={}), got {:?}", use_cache, other),
            }
            assert!(!output.exists());
        }
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            endpoints: vec![],
            output: dir.path().join("props.csv"),
            ..ExportConfig::default()
        };
        assert!(matches!(
            build_props_csv(&config).await,
            Err(PropsError::Config(_))
        ));
    }
}
