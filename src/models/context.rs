// ModelContext - models and device shared by every file of a run
//
// Built once before any file is processed. Models load lazily on first use and
// the load outcome (success or failure) is kept for the rest of the run.

use std::sync::Arc;
use log::{error, info};
use tokio::sync::OnceCell;

use super::device::{resolve_device, Device, DeviceSelection};
use super::hardware_detector::HardwareProfile;
use super::loader::ModelLoader;
use crate::audio::{AudioDecoder, FfmpegDecoder};
use crate::diarization::SpeakerDiarizer;
use crate::errors::{ContextError, DiarizationError, TranscriptionError};
use crate::transcription::SpeechRecognizer;

type LoadOutcome<T> = Result<Arc<T>, String>;

pub struct ModelContext {
    selection: DeviceSelection,
    model_id: String,
    needs_diarization: bool,
    loader: Arc<dyn ModelLoader>,
    decoder: Arc<dyn AudioDecoder>,
    recognizer: OnceCell<LoadOutcome<dyn SpeechRecognizer>>,
    diarizer: OnceCell<LoadOutcome<dyn SpeakerDiarizer>>,
}

impl ModelContext {
    /// Validate run preconditions and resolve the device.
    ///
    /// Fails only when diarization is requested without a credential.
    /// An unavailable accelerator falls back to the CPU with a warning.
    pub fn acquire(
        device: Device,
        model_id: &str,
        needs_diarization: bool,
        credential: Option<&str>,
        loader: Arc<dyn ModelLoader>,
    ) -> Result<Self, ContextError> {
        let has_credential = credential.map(|c| !c.trim().is_empty()).unwrap_or(false);
        if needs_diarization && !has_credential {
            return Err(ContextError::MissingCredential);
        }

        let selection = resolve_device(device, HardwareProfile::detect());
        info!(
            "Model context ready: model={}, device={}, diarization={}",
            model_id, selection.resolved, needs_diarization
        );

        Ok(Self {
            selection,
            model_id: model_id.to_string(),
            needs_diarization,
            loader,
            decoder: Arc::new(FfmpegDecoder::new()),
            recognizer: OnceCell::new(),
            diarizer: OnceCell::new(),
        })
    }

    /// Replace the ffmpeg decoder
    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn device(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn decoder(&self) -> &dyn AudioDecoder {
        self.decoder.as_ref()
    }

    /// The ASR model, loading it on first call
    pub async fn recognizer(&self) -> Result<Arc<dyn SpeechRecognizer>, TranscriptionError> {
        let outcome = self
            .recognizer
            .get_or_init(|| async {
                info!("Loading speech recognition model '{}'", self.model_id);
                self.loader
                    .load_recognizer(&self.model_id, &self.selection)
                    .await
                    .map_err(|e| {
                        error!("Failed to load model '{}': {:#}", self.model_id, e);
                        format!("{:#}", e)
                    })
            })
            .await;

        outcome.clone().map_err(TranscriptionError::ModelUnavailable)
    }

    /// The diarization pipeline, loading it on first call
    pub async fn diarizer(&self) -> Result<Arc<dyn SpeakerDiarizer>, DiarizationError> {
        if !self.needs_diarization {
            return Err(DiarizationError::ModelUnavailable(
                "speaker annotation was not requested for this run".to_string(),
            ));
        }

        let outcome = self
            .diarizer
            .get_or_init(|| async {
                info!("Loading diarization pipeline");
                self.loader.load_diarizer(&self.selection).await.map_err(|e| {
                    error!("Failed to load diarization pipeline: {:#}", e);
                    format!("{:#}", e)
                })
            })
            .await;

        outcome.clone().map_err(DiarizationError::ModelUnavailable)
    }
}
