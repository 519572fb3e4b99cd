// Streaming HTTP downloads shared by model management and URL inputs
//
// Files are streamed into a temporary sibling and renamed once complete, so an
// interrupted download never leaves a truncated file under the final name.

use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use futures_util::StreamExt;
use log::{debug, info};
use reqwest::{Client, Response};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Hosts that receive the Hugging Face access token as a bearer credential
const HF_HOSTS: &[&str] = &["huggingface.co", "hf.co"];

/// Build the HTTP client used for every download in a run
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("mediascribe/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Whether a URL points at a Hugging Face host
pub fn is_hugging_face_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|host| HF_HOSTS.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h))))
        .unwrap_or(false)
}

/// Send a GET request, attaching the credential only for Hugging Face hosts
pub async fn get(client: &Client, url: &str, credential: Option<&str>) -> Result<Response> {
    let mut request = client.get(url);
    if let Some(token) = credential.filter(|_| is_hugging_face_url(url)) {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| anyhow!("Failed to start download from {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(anyhow!("Download of {} failed with status: {}", url, response.status()));
    }

    Ok(response)
}

/// Temporary path used while a download is in flight
pub fn partial_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest_path.with_file_name(name)
}

/// Stream a response body to `dest_path`, logging progress every 10%
pub async fn stream_to_file(response: Response, dest_path: &Path, label: &str) -> Result<u64> {
    if let Some(parent) = dest_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await
                .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
        }
    }

    let total_size = response.content_length().unwrap_or(0);
    info!("Downloading {} ({:.1} MB)", label, total_size as f64 / (1024.0 * 1024.0));

    let temp_path = partial_path(dest_path);
    let mut file = fs::File::create(&temp_path).await
        .map_err(|e| anyhow!("Failed to create temp file {}: {}", temp_path.display(), e))?;

    let mut downloaded: u64 = 0;
    let mut last_reported: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| anyhow!("Download error for {}: {}", label, e))?;

        file.write_all(&chunk).await
            .map_err(|e| anyhow!("Failed to write chunk: {}", e))?;

        downloaded += chunk.len() as u64;

        if total_size > 0 {
            let progress = downloaded * 100 / total_size;
            if progress >= last_reported + 10 {
                last_reported = progress - progress % 10;
                info!("Download progress for {}: {}%", label, last_reported);
            } else {
                perf_trace!("Download progress for {}: {} / {} bytes", label, downloaded, total_size);
            }
        }
    }

    file.flush().await?;
    drop(file);

    fs::rename(&temp_path, dest_path).await
        .map_err(|e| anyhow!("Failed to rename temp file: {}", e))?;

    debug!("Downloaded {} bytes to {}", downloaded, dest_path.display());
    Ok(downloaded)
}

/// Download `url` to `dest_path`
pub async fn download_file(
    client: &Client,
    url: &str,
    dest_path: &Path,
    credential: Option<&str>,
    label: &str,
) -> Result<()> {
    info!("Downloading {} from {}", label, url);
    let response = get(client, url, credential).await?;
    stream_to_file(response, dest_path, label).await?;
    info!("Successfully downloaded {} to {}", label, dest_path.display());
    Ok(())
}
