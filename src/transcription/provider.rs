// Speech recognition provider abstraction
//
// The pipeline only talks to ASR backends through this trait so a run can use
// whisper.cpp in production and an in-memory double in tests.

use crate::audio::DecodedAudio;
use crate::errors::TranscriptionError;

use super::types::TranscriptionSegment;

/// Per-call options for a recognition pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionRequest {
    /// ISO-639-1 code; None lets the model detect the language
    pub language: Option<String>,
    /// Emit English text regardless of the spoken language
    pub translate: bool,
}

/// Raw backend output, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    pub segments: Vec<TranscriptionSegment>,
    /// Language the model used (requested or detected), if known
    pub language: Option<String>,
}

/// An ASR backend able to transcribe a whole decoded file in one call.
///
/// Implementations hold model state and are not expected to be called
/// concurrently; the orchestrator serializes every call.
pub trait SpeechRecognizer: Send + Sync {
    fn recognize(
        &self,
        audio: &DecodedAudio,
        request: &RecognitionRequest,
    ) -> Result<Recognition, TranscriptionError>;

    /// Backend name for logs and the structured transcript
    fn name(&self) -> &str;
}
