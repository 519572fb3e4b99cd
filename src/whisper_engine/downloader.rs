// Whisper Engine - Model Downloading
use std::path::{Path, PathBuf};
use tokio::fs;
use reqwest::Client;
use anyhow::{Result, anyhow};
use log::{info, warn};

use super::model_registry::{get_model_url, model_path, model_size_mb, validate_model_file};
use crate::downloader::download_file;

/// Make sure `model_name` is present and valid in `models_dir`, downloading it if needed.
///
/// Unknown model names are accepted when a matching GGML file already exists.
pub async fn ensure_model_downloaded(
    client: &Client,
    models_dir: &Path,
    model_name: &str,
    credential: Option<&str>,
) -> Result<PathBuf> {
    let file_path = model_path(models_dir, model_name);

    if file_path.exists() {
        match validate_model_file(&file_path).await {
            Ok(()) => {
                info!("Whisper model {} found at {}", model_name, file_path.display());
                return Ok(file_path);
            }
            Err(e) => {
                warn!("Existing model file {} is corrupted ({}), downloading again", file_path.display(), e);
                fs::remove_file(&file_path).await
                    .map_err(|e| anyhow!("Failed to remove corrupted model file: {}", e))?;
            }
        }
    }

    let model_url = get_model_url(model_name)
        .ok_or_else(|| anyhow!(
            "Unsupported model: {} (no {} in {})",
            model_name,
            file_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            models_dir.display()
        ))?;

    if !models_dir.exists() {
        fs::create_dir_all(models_dir).await
            .map_err(|e| anyhow!("Failed to create models directory: {}", e))?;
    }

    if let Some(size_mb) = model_size_mb(model_name) {
        info!("Model {} is not downloaded yet (~{} MB)", model_name, size_mb);
    }

    download_validated(client, &model_url, &file_path, credential, model_name).await?;
    Ok(file_path)
}

/// Download a model file and drop it again if it is not a GGML/GGUF file
async fn download_validated(
    client: &Client,
    url: &str,
    file_path: &Path,
    credential: Option<&str>,
    label: &str,
) -> Result<()> {
    download_file(client, url, file_path, credential, label).await?;

    if let Err(e) = validate_model_file(file_path).await {
        if let Err(remove_err) = fs::remove_file(file_path).await {
            warn!("Failed to remove invalid model file {}: {}", file_path.display(), remove_err);
        }
        return Err(anyhow!("Downloaded model {} failed validation: {}", label, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use crate::test_support::{local_client, serve};

    #[tokio::test]
    async fn test_existing_valid_model_is_reused() {
        let dir = tempdir().unwrap();
        let path = model_path(dir.path(), "custom-finetune");
        std::fs::write(&path, b"ggml\x00\x00\x00\x00").unwrap();

        let client = Client::new();
        let found = ensure_model_downloaded(&client, dir.path(), "custom-finetune", None).await.unwrap();
        assert_eq!(found, path);
    }

    #[tokio::test]
    async fn test_unknown_missing_model_is_an_error() {
        let dir = tempdir().unwrap();
        let client = Client::new();

        let err = ensure_model_downloaded(&client, dir.path(), "not-a-model", None).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported model"));
    }

    #[tokio::test]
    async fn test_invalid_download_is_removed() {
        let server = serve(vec![
            ("/ggml-bad.bin", "text/html", "<html>rate limited</html>"),
            ("/ggml-good.bin", "application/octet-stream", "ggml\0\0\0\0weights"),
        ])
        .await;
        let dir = tempdir().unwrap();
        let client = local_client();

        let bad = dir.path().join("ggml-bad.bin");
        let err = download_validated(&client, &server.url("/ggml-bad.bin"), &bad, None, "bad")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed validation"));
        assert!(!bad.exists());

        let good = dir.path().join("ggml-good.bin");
        download_validated(&client, &server.url("/ggml-good.bin"), &good, None, "good")
            .await
            .unwrap();
        assert!(good.exists());
    }
}
