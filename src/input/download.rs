// Fetching remote media into the local download cache
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use sha2::{Digest, Sha256};

use super::media::{is_supported, SUPPORTED_EXTENSIONS};
use crate::downloader::{get, http_client, stream_to_file};
use crate::file_io::sanitize_filename;

/// Brings a remote media URL to a local path
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str, cache_dir: &Path) -> Result<PathBuf>;
}

/// Map a response Content-Type to a supported file extension
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match mime.as_str() {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some("wav"),
        "audio/mp4" | "audio/x-m4a" | "audio/m4a" => Some("m4a"),
        "audio/aac" | "audio/x-aac" => Some("aac"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/ogg" | "application/ogg" => Some("ogg"),
        "video/x-matroska" => Some("mkv"),
        "video/quicktime" => Some("mov"),
        "video/mp4" => Some("mp4"),
        "video/x-msvideo" | "video/avi" => Some("avi"),
        "video/mpeg" => Some("mpeg"),
        _ => None,
    }
}

/// Short, stable key for a URL: the first 12 hex digits of its SHA-256
pub fn url_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

/// Cache location for a URL: `<cache_dir>/<url key>/<last path segment>`.
///
/// The per-URL directory keeps distinct URLs apart even when their last
/// segments match, while the file keeps its readable name.
pub fn cache_path(cache_dir: &Path, url: &str) -> Result<PathBuf> {
    let parsed = reqwest::Url::parse(url).map_err(|e| anyhow!("Invalid URL {}: {}", url, e))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(sanitize_filename)
        .unwrap_or_else(|| sanitize_filename(parsed.host_str().unwrap_or("download")));
    Ok(cache_dir.join(url_key(url)).join(name))
}

/// An earlier download of `base` saved with a Content-Type derived extension
fn cached_with_extension(base: &Path) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| with_extra_extension(base, ext))
        .find(|candidate| candidate.exists())
}

fn with_extra_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(ext);
    base.with_file_name(name)
}

/// HTTP fetcher with a URL-keyed cache
pub struct HttpFetcher {
    client: Client,
    /// Sent only to Hugging Face hosts
    credential: Option<String>,
}

impl HttpFetcher {
    pub fn new(credential: Option<String>) -> Result<Self> {
        Ok(Self::with_client(http_client()?, credential))
    }

    pub fn with_client(client: Client, credential: Option<String>) -> Self {
        Self { client, credential }
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cache_dir: &Path) -> Result<PathBuf> {
        let cached = cache_path(cache_dir, url)?;
        let named_by_url = is_supported(&cached);

        let hit = if named_by_url {
            Some(cached.clone()).filter(|p| p.exists())
        } else {
            cached_with_extension(&cached)
        };
        if let Some(hit) = hit {
            info!("Using cached download for {}: {}", url, hit.display());
            return Ok(hit);
        }

        let response = get(&self.client, url, self.credential.as_deref()).await?;

        let dest = if named_by_url {
            cached
        } else {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let ext = extension_for_content_type(&content_type).ok_or_else(|| {
                anyhow!("Unsupported media type '{}' for {}", content_type, url)
            })?;
            with_extra_extension(&cached, ext)
        };

        stream_to_file(response, &dest, url).await?;
        info!("Downloaded {} to {}", url, dest.display());
        Ok(dest)
    }
}
