// Transcription Module
//
// Split into focused files:
// - types.rs: Word, TranscriptionSegment, AnnotatedSegment, TranscriptionResult
// - provider.rs: SpeechRecognizer trait implemented by ASR backends
// - engine.rs: per-file transcription and timestamp normalization

pub mod types;
pub mod provider;
pub mod engine;

pub use types::{
    AnnotatedSegment, TranscriptionResult, TranscriptionSegment, Word, UNKNOWN_SPEAKER,
};
pub use provider::{Recognition, RecognitionRequest, SpeechRecognizer};
pub use engine::{normalize_segments, transcribe, Transcript, TranscriptionOptions};
