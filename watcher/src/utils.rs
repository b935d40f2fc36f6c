//! Utility functions
//!
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

use common::{Error, Result};
use reqwest::{Client, Url};

/// Parse a resource location as a remote `http(s)` URL.
pub fn parse_url(location: &str) -> Option<Url> {
    Url::parse(location)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn hashed(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Name of the cached copy of `url`: a hash of the whole URL followed by its file name.
pub fn cache_file_name(url: &Url) -> Option<String> {
    let file_name = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    Some(format!("{:016x}-{}", hashed(url.as_str()), file_name))
}

/// Download a file from a URL to a given filepath.
pub async fn download_file(client: &Client, url: Url, filepath: impl AsRef<Path>) -> Result<()> {
    let resource = url.to_string();
    let resp = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|err| Error::load(&resource, err))?;
    let content = resp.bytes().await.map_err(|err| Error::load(&resource, err))?;

    tokio::fs::write(filepath, &content)
        .await
        .map_err(|err| Error::load(&resource, err))?;

    Ok(())
}

/// Local path of a resource, downloading it into `cache_dir` first if it is a URL.
pub async fn fetch_resource(client: &Client, location: &str, cache_dir: &Path) -> Result<PathBuf> {
    let url = match parse_url(location) {
        Some(url) => url,
        None => return Ok(PathBuf::from(location)),
    };

    let file_name =
        cache_file_name(&url).ok_or_else(|| Error::load(location, "URL has no file name"))?;
    let filepath = cache_dir.join(file_name);

    tokio::fs::create_dir_all(cache_dir)
        .await
        .map_err(|err| Error::load(location, err))?;

    log::debug!("Downloading {} to {}", location, filepath.display());
    download_file(client, url, &filepath).await?;

    Ok(filepath)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recognizes_urls() {
        assert!(parse_url("https://example.com/models/model.onnx").is_some());
        assert!(parse_url("http://localhost:8000/metadata.json").is_some());
        assert!(parse_url("models/model.onnx").is_none());
        assert!(parse_url("/srv/http/model.onnx").is_none());
        assert!(parse_url("file:///srv/model.onnx").is_none());
    }

    #[test]
    fn cache_name_uses_last_path_segment() {
        let url = parse_url("https://example.com/models/v2/model.onnx?download=1").unwrap();
        let name = cache_file_name(&url).unwrap();
        assert!(name.ends_with("-model.onnx"));

        let trailing_slash = parse_url("https://example.com/models/metadata.json/").unwrap();
        assert!(cache_file_name(&trailing_slash)
            .unwrap()
            .ends_with("-metadata.json"));
    }

    #[test]
    fn url_without_file_name_has_no_cache_name() {
        let url = parse_url("https://example.com/").unwrap();
        assert_eq!(cache_file_name(&url), None);
    }

    #[test]
    fn same_file_name_from_different_urls_does_not_collide() {
        let a = parse_url("https://a.example.com/model.onnx").unwrap();
        let b = parse_url("https://b.example.com/model.onnx").unwrap();
        assert_ne!(cache_file_name(&a), cache_file_name(&b));
    }

    #[tokio::test]
    async fn local_paths_are_used_as_is() -> Result<()> {
        let cache_dir = tempfile::tempdir()?;
        let path = fetch_resource(&Client::new(), "models/metadata.json", cache_dir.path()).await?;
        assert_eq!(path, PathBuf::from("models/metadata.json"));
        Ok(())
    }

    #[tokio::test]
    async fn url_without_file_name_is_a_load_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        let result = fetch_resource(&Client::new(), "https://example.com/", cache_dir.path()).await;
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[tokio::test]
    async fn unreachable_url_is_a_load_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) on localhost refuses connections on test machines
        let result = fetch_resource(
            &Client::new(),
            "http://127.0.0.1:9/model.onnx",
            cache_dir.path(),
        )
        .await;
        assert!(matches!(result, Err(Error::Load { .. })));
    }
}
