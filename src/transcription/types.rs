// transcription/types.rs
//
// Transcript data types shared by every pipeline stage.

use serde::{Deserialize, Serialize};

use crate::diarization::SpeakerTurn;
use crate::input::MediaFile;
use crate::subtitles::SubtitleTrack;

/// Label given to segments without an overlapping speaker turn
pub const UNKNOWN_SPEAKER: &str = "unknown";

/// A single word with its timing in seconds from the start of the media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            confidence: None,
        }
    }
}

/// A contiguous span of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<Word>,
}

impl TranscriptionSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words,
        }
    }
}

/// A segment with the speaker chosen by the diarization merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSegment {
    #[serde(flatten)]
    pub segment: TranscriptionSegment,
    pub speaker: String,
}

impl AnnotatedSegment {
    pub fn unknown(segment: TranscriptionSegment) -> Self {
        Self {
            segment,
            speaker: UNKNOWN_SPEAKER.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.speaker == UNKNOWN_SPEAKER
    }
}

/// Everything produced for one media file, ready to be persisted
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub media: MediaFile,
    /// Name of the recognizer that produced the transcript
    pub model: String,
    pub language: Option<String>,
    pub duration_secs: f64,
    pub segments: Vec<AnnotatedSegment>,
    /// Present only when annotation ran
    pub speaker_turns: Option<Vec<SpeakerTurn>>,
    /// Present only when subtitles were requested
    pub subtitles: Option<SubtitleTrack>,
}

/// Format seconds as [HH:MM:SS] for log output
pub fn format_media_time(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0).floor() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let secs = total_seconds % 60;

    format!("[{:02}:{:02}:{:02}]", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_media_time() {
        assert_eq!(format_media_time(0.0), "[00:00:00]");
        assert_eq!(format_media_time(125.9), "[00:02:05]");
        assert_eq!(format_media_time(3725.0), "[01:02:05]");
        assert_eq!(format_media_time(-3.0), "[00:00:00]");
    }

    #[test]
    fn test_annotated_segment_serializes_flat() {
        let segment = AnnotatedSegment::unknown(TranscriptionSegment::new(
            0.0,
            1.0,
            "hello",
            vec![Word::new("hello", 0.0, 1.0)],
        ));

        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["speaker"], "unknown");
        assert_eq!(json["text"], "hello");
        assert!(json["words"][0].get("confidence").is_none());
    }
}
