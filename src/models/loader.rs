// Loading the ASR and diarization backends
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use super::device::DeviceSelection;
use super::hardware_detector::HardwareProfile;
use crate::diarization::{ensure_models_downloaded, DiarizationConfig, PyannoteDiarizer, SpeakerDiarizer};
use crate::downloader::http_client;
use crate::transcription::SpeechRecognizer;
use crate::whisper_engine::{ensure_model_downloaded, load_context, WhisperRecognizer};

/// Builds inference backends for a run. Called at most once per model kind.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load_recognizer(
        &self,
        model_id: &str,
        device: &DeviceSelection,
    ) -> Result<Arc<dyn SpeechRecognizer>>;

    async fn load_diarizer(&self, device: &DeviceSelection) -> Result<Arc<dyn SpeakerDiarizer>>;
}

/// Loads whisper.cpp and pyannote models from a local directory, downloading missing files
pub struct LocalModelLoader {
    models_dir: PathBuf,
    credential: Option<String>,
    client: Client,
}

impl LocalModelLoader {
    pub fn new(models_dir: PathBuf, credential: Option<String>) -> Result<Self> {
        info!("Using models directory: {}", models_dir.display());
        Ok(Self {
            models_dir,
            credential,
            client: http_client()?,
        })
    }
}

#[async_trait]
impl ModelLoader for LocalModelLoader {
    async fn load_recognizer(
        &self,
        model_id: &str,
        device: &DeviceSelection,
    ) -> Result<Arc<dyn SpeechRecognizer>> {
        let model_path =
            ensure_model_downloaded(&self.client, &self.models_dir, model_id, self.credential.as_deref()).await?;

        let profile = HardwareProfile::detect();
        let decoding = profile.decoding_config(device.uses_gpu());
        debug!("Whisper decoding config: {:?}", decoding);

        let ctx = load_context(&model_path, model_id, device, profile)?;
        Ok(Arc::new(WhisperRecognizer::new(ctx, model_id, decoding)))
    }

    async fn load_diarizer(&self, device: &DeviceSelection) -> Result<Arc<dyn SpeakerDiarizer>> {
        let (segmentation_model_path, embedding_model_path) =
            ensure_models_downloaded(&self.client, &self.models_dir, self.credential.as_deref()).await?;

        if device.uses_gpu() {
            debug!("Diarization models run on the CPU regardless of device {}", device.resolved);
        }

        let diarizer = PyannoteDiarizer::new(DiarizationConfig::new(segmentation_model_path, embedding_model_path))?;
        Ok(Arc::new(diarizer))
    }
}
