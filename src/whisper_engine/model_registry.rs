// Whisper Engine - Model Registry
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use anyhow::{Result, anyhow};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Known models: (name, size_mb, description)
pub const MODEL_CONFIGS: &[(&str, u32, &str)] = &[
    // Standard f16 models (full precision, multilingual)
    ("tiny", 78, "Fastest processing, lowest accuracy"),
    ("base", 148, "Good balance of speed and accuracy"),
    ("small", 488, "Better accuracy, moderate speed"),
    ("medium", 1530, "High accuracy for professional use"),
    ("large-v1", 3090, "First large model"),
    ("large-v2", 3090, "Large model, robust on long-form audio"),
    ("large-v3", 3100, "Best accuracy, latest large model"),
    ("large-v3-turbo", 1620, "Fast large model with great accuracy"),

    // English-only models
    ("tiny.en", 78, "English-only tiny model"),
    ("base.en", 148, "English-only base model"),
    ("small.en", 488, "English-only small model"),
    ("medium.en", 1530, "English-only medium model"),

    // Quantized models (smaller file size, good quality)
    ("tiny-q5_1", 32, "Quantized tiny"),
    ("base-q5_1", 60, "Quantized base"),
    ("small-q5_1", 190, "Quantized small"),
    ("medium-q5_0", 539, "Quantized medium"),
    ("large-v2-q5_0", 1080, "Quantized large-v2"),
    ("large-v3-q5_0", 1080, "Quantized large-v3"),
    ("large-v3-turbo-q5_0", 574, "Quantized turbo"),
    ("large-v3-turbo-q8_0", 874, "High-quality quantized turbo"),
];

/// Whether the registry knows how to download `model_name`
pub fn is_known_model(model_name: &str) -> bool {
    MODEL_CONFIGS.iter().any(|(name, _, _)| *name == model_name)
}

/// Approximate download size of a known model
pub fn model_size_mb(model_name: &str) -> Option<u32> {
    MODEL_CONFIGS
        .iter()
        .find(|(name, _, _)| *name == model_name)
        .map(|(_, size, _)| *size)
}

/// GGML file name of a model
pub fn model_file_name(model_name: &str) -> String {
    format!("ggml-{}.bin", model_name)
}

/// Location of a model inside the models directory
pub fn model_path(models_dir: &Path, model_name: &str) -> PathBuf {
    models_dir.join(model_file_name(model_name))
}

/// Get model URL for downloading
pub fn get_model_url(model_name: &str) -> Option<String> {
    if is_known_model(model_name) {
        Some(format!("{}/{}", MODEL_BASE_URL, model_file_name(model_name)))
    } else {
        None
    }
}

/// Validate if a model file is a valid GGML file by checking its header
pub async fn validate_model_file(model_path: &Path) -> Result<()> {
    let mut file = fs::File::open(model_path).await
        .map_err(|e| anyhow!("Failed to open model file: {}", e))?;

    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer).await
        .map_err(|e| anyhow!("Failed to read model file header: {}", e))?;

    // GGML magic number (various versions and endianness)
    if buffer.starts_with(b"ggml") || buffer.starts_with(b"GGUF") || buffer.starts_with(b"ggmf") ||
       buffer.starts_with(b"lmgg") || buffer.starts_with(b"FUGU") || buffer.starts_with(b"fmgg") {
        Ok(())
    } else {
        Err(anyhow!("Invalid model file: missing GGML/GGUF magic number. Found: {:?}",
                   String::from_utf8_lossy(&buffer[..4])))
    }
}
