// Diarization model manager - handles automatic downloading of pyannote models

use std::path::{Path, PathBuf};
use anyhow::Result;
use log::info;
use reqwest::Client;
use tokio::fs;

use crate::downloader::download_file;

/// Model URLs for pyannote diarization
/// These models are the official pyannote-rs releases and are compatible with pyannote-rs 0.3.x
const SEGMENTATION_MODEL_URL: &str =
    "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/segmentation-3.0.onnx";
const EMBEDDING_MODEL_URL: &str =
    "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/wespeaker_en_voxceleb_CAM++.onnx";

/// Expected file names for the models
pub const SEGMENTATION_MODEL_NAME: &str = "segmentation-3.0.onnx";
pub const EMBEDDING_MODEL_NAME: &str = "wespeaker_en_voxceleb_CAM++.onnx";

/// Check if diarization models are available
pub fn are_models_available(models_dir: &Path) -> bool {
    let (seg_path, emb_path) = get_model_paths(models_dir);
    seg_path.exists() && emb_path.exists()
}

/// Get the paths for diarization models
pub fn get_model_paths(models_dir: &Path) -> (PathBuf, PathBuf) {
    (
        models_dir.join(SEGMENTATION_MODEL_NAME),
        models_dir.join(EMBEDDING_MODEL_NAME),
    )
}

/// Download diarization models if they don't exist
pub async fn ensure_models_downloaded(
    client: &Client,
    models_dir: &Path,
    credential: Option<&str>,
) -> Result<(PathBuf, PathBuf)> {
    if are_models_available(models_dir) {
        info!("Diarization models found in {:?}", models_dir);
        return Ok(get_model_paths(models_dir));
    }

    if !models_dir.exists() {
        fs::create_dir_all(models_dir).await?;
    }

    let (seg_path, emb_path) = get_model_paths(models_dir);

    if !seg_path.exists() {
        info!("Segmentation model not found, downloading...");
        download_file(client, SEGMENTATION_MODEL_URL, &seg_path, credential, "Segmentation Model").await?;
    } else {
        info!("Segmentation model already exists at {:?}", seg_path);
    }

    if !emb_path.exists() {
        info!("Embedding model not found, downloading...");
        download_file(client, EMBEDDING_MODEL_URL, &emb_path, credential, "Embedding Model").await?;
    } else {
        info!("Embedding model already exists at {:?}", emb_path);
    }

    Ok((seg_path, emb_path))
}
