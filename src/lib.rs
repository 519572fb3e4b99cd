// mediascribe - batch transcription of audio and video files
//
// Resolves an input specification (file, directory, URL or .list manifest)
// into media files and runs each one through the same pipeline:
// decode -> Whisper transcription -> optional speaker annotation ->
// optional subtitles -> artifacts on disk. Models are loaded once per run.

// Performance logging macros - exported for use by other modules
#[macro_use]
pub mod macros;

pub mod errors;
pub mod config;
pub mod downloader;
pub mod input;
pub mod audio;
pub mod models;
pub mod whisper_engine;
pub mod diarization;
pub mod transcription;
pub mod subtitles;
pub mod file_io;
pub mod batch;

#[cfg(test)]
mod test_support;

pub use batch::{BatchOrchestrator, FileOutcome, FileStatus, RunSummary};
pub use config::{Args, ConfigFile, Invocation, RunConfig};
pub use errors::{
    ArtifactWriteError, BatchError, ConfigError, ContextError, DiarizationError, InputError,
    TranscriptionError,
};
pub use input::{InputResolver, MediaFile, MediaOrigin, SUPPORTED_EXTENSIONS};
pub use models::{Device, ModelContext};
