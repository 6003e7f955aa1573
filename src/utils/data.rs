use crate::api::bovada_api::BovadaApiResponse;
use crate::config::Endpoint;
use crate::error::{PropsError, Result};
use std::path::{Path, PathBuf};

/// Turn an endpoint label into a file-name friendly slug
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// `<cache_dir>/<index>-<slug>.json`, keyed by position so reruns line up
pub fn cache_file_path(cache_dir: &Path, index: usize, endpoint: &Endpoint) -> PathBuf {
    let slug = slugify(&endpoint.label);
    let name = if slug.is_empty() {
        format!("{:02}.json", index)
    } else {
        format!("{:02}-{}.json", index, slug)
    };
    cache_dir.join(name)
}

/// Save a raw response document to a JSON cache file
pub async fn save_response_to_cache(response: &BovadaApiResponse, cache_file: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| PropsError::Io {
        path: cache_file.to_path_buf(),
        source,
    };

    if let Some(parent) = cache_file.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(response).map_err(|source| PropsError::Json {
        endpoint: cache_file.display().to_string(),
        source,
    })?;
    tokio::fs::write(cache_file, json).await.map_err(io_err)?;
    Ok(())
}

/// Load a raw response document from a JSON cache file
pub async fn load_response_from_cache(cache_file: &Path) -> Result<BovadaApiResponse> {
    let json = tokio::fs::read(cache_file).await.map_err(|source| PropsError::Io {
        path: cache_file.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&json).map_err(|source| PropsError::Json {
        endpoint: cache_file.display().to_string(),
        source,
    })
}

/// Write the finished CSV, replacing any existing file.
///
/// The bytes go to a sibling `.tmp` file which is then renamed over the
/// target, so a failed run never leaves a half-written CSV behind.
pub async fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| PropsError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| {
            write_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output path has no file name",
            ))
        })?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = tokio::fs::write(&tmp_path, contents).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    Ok(())
}
