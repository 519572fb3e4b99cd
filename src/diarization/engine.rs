// Diarization engine using pyannote-rs
// Wraps segmentation and speaker embedding extraction

use std::path::PathBuf;
use std::sync::Mutex;
use anyhow::{Result, anyhow};
use log::{debug, info, warn};

use pyannote_rs::{EmbeddingExtractor, EmbeddingManager, get_segments};

use super::provider::{speaker_label, SpeakerDiarizer, SpeakerTurn};
use crate::audio::DecodedAudio;
use crate::errors::DiarizationError;

/// Configuration for diarization
#[derive(Debug, Clone)]
pub struct DiarizationConfig {
    /// Path to segmentation model (segmentation-3.0.onnx)
    pub segmentation_model_path: PathBuf,
    /// Path to speaker embedding model (wespeaker_en_voxceleb_CAM++.onnx)
    pub embedding_model_path: PathBuf,
    /// Maximum number of speakers to track per file
    pub max_speakers: usize,
    /// Similarity threshold for speaker matching (0.0 to 1.0)
    pub similarity_threshold: f32,
}

impl DiarizationConfig {
    pub fn new(segmentation_model_path: PathBuf, embedding_model_path: PathBuf) -> Self {
        Self {
            segmentation_model_path,
            embedding_model_path,
            max_speakers: 10,
            similarity_threshold: 0.5,
        }
    }
}

/// pyannote-rs backed diarizer. Speaker clusters are reset for every file.
pub struct PyannoteDiarizer {
    config: DiarizationConfig,
    embedding_extractor: Mutex<EmbeddingExtractor>,
}

impl PyannoteDiarizer {
    pub fn new(config: DiarizationConfig) -> Result<Self> {
        info!("Initializing diarization engine");
        debug!("Segmentation model: {:?}", config.segmentation_model_path);
        debug!("Embedding model: {:?}", config.embedding_model_path);

        if !config.segmentation_model_path.exists() {
            return Err(anyhow!(
                "Segmentation model not found: {:?}",
                config.segmentation_model_path
            ));
        }
        if !config.embedding_model_path.exists() {
            return Err(anyhow!(
                "Embedding model not found: {:?}",
                config.embedding_model_path
            ));
        }

        // pyannote-rs uses eyre, convert to anyhow
        let embedding_extractor = EmbeddingExtractor::new(&config.embedding_model_path)
            .map_err(|e| anyhow!("Failed to create embedding extractor: {}", e))?;

        info!("Diarization engine initialized successfully");

        Ok(Self {
            config,
            embedding_extractor: Mutex::new(embedding_extractor),
        })
    }
}

impl SpeakerDiarizer for PyannoteDiarizer {
    fn diarize(&self, audio: &DecodedAudio) -> Result<Vec<SpeakerTurn>, DiarizationError> {
        info!("Running diarization on {} samples at {} Hz", audio.samples.len(), audio.sample_rate);

        let samples_i16 = audio.to_i16();

        let segments_iter = get_segments(&samples_i16, audio.sample_rate, &self.config.segmentation_model_path)
            .map_err(|e| DiarizationError::Inference(format!("segmentation failed: {}", e)))?;

        let mut extractor = self.embedding_extractor
            .lock()
            .map_err(|_| DiarizationError::Inference("embedding extractor lock poisoned".to_string()))?;

        // Fresh clusters per file so labels restart at SPEAKER_00
        let mut embedding_manager = EmbeddingManager::new(self.config.max_speakers);
        let mut turns = Vec::new();
        let mut unassigned = 0usize;

        for segment_result in segments_iter {
            let segment = match segment_result {
                Ok(seg) => seg,
                Err(e) => {
                    warn!("Failed to process segment: {}", e);
                    continue;
                }
            };

            let embedding: Vec<f32> = match extractor.compute(&segment.samples) {
                Ok(iter) => iter.collect(),
                Err(e) => {
                    warn!("Failed to compute embedding for segment: {}", e);
                    continue;
                }
            };

            match embedding_manager.search_speaker(embedding, self.config.similarity_threshold) {
                Some(speaker_idx) => {
                    perf_trace!("Turn [{:.2}s-{:.2}s] -> {}", segment.start, segment.end, speaker_label(speaker_idx));
                    turns.push(SpeakerTurn::new(speaker_label(speaker_idx), segment.start, segment.end));
                }
                None => unassigned += 1,
            }
        }

        if unassigned > 0 {
            warn!(
                "Max speakers ({}) reached, {} speech segments left without a speaker",
                self.config.max_speakers, unassigned
            );
        }

        info!("Diarization complete: {} speaker turns", turns.len());
        Ok(turns)
    }
}
