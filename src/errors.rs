// Error taxonomy for a batch run
//
// Whole-run errors (BatchError) stop a run before any file is processed.
// Everything else is scoped to a single file or a single artifact and is
// recorded in the run summary instead of propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning the input specification into media files
#[derive(Debug, Error)]
pub enum InputError {
    /// Malformed input specification (missing path, nested manifest, unreadable manifest)
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Resolution finished but produced no media file
    #[error("no supported media files found in '{0}'")]
    NoInput(String),
}

/// Errors raised while acquiring the shared model context
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("speaker annotation requested but no Hugging Face access token was provided (use --hf_token or HF_TOKEN)")]
    MissingCredential,
}

/// Errors raised while building the run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown device '{0}' (expected cpu, gpu or mps)")]
    UnknownDevice(String),
    #[error("sub_length must be a positive number of words")]
    InvalidSubLength,
    #[error("no input given: pass --files or set \"files\" in the config file")]
    MissingFiles,
}

/// Per-file transcription failure. Recorded as the file's failure reason.
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    /// The media could not be decoded to PCM
    #[error("failed to decode media: {0}")]
    Decode(String),
    /// The ASR model could not be loaded for this run
    #[error("speech recognition model unavailable: {0}")]
    ModelUnavailable(String),
    /// The model failed while running inference
    #[error("speech recognition failed: {0}")]
    Inference(String),
}

/// Diarization failure. Never fails a file; degrades it to "unknown" speakers.
#[derive(Debug, Clone, Error)]
pub enum DiarizationError {
    #[error("diarization model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("diarization failed: {0}")]
    Inference(String),
    #[error("no speech detected by diarization")]
    NoSpeech,
}

/// Failure to write a single artifact. Never blocks the other artifacts.
#[derive(Debug, Error)]
pub enum ArtifactWriteError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize structured transcript: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that halt the whole run before any file is processed
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Input(#[from] InputError),
}

impl BatchError {
    /// True for the "resolution produced nothing" case, which is reported in the summary
    pub fn is_no_input(&self) -> bool {
        matches!(self, BatchError::Input(InputError::NoInput(_)))
    }
}
