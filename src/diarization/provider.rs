// Speaker diarization provider abstraction

use serde::{Deserialize, Serialize};

use crate::audio::DecodedAudio;
use crate::errors::DiarizationError;

/// One interval attributed to a speaker, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    pub speaker: String,
    pub start: f64,
    pub end: f64,
}

impl SpeakerTurn {
    pub fn new(speaker: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            speaker: speaker.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Format the label for the n-th distinct speaker of a file
pub fn speaker_label(index: usize) -> String {
    format!("SPEAKER_{:02}", index)
}

/// A diarization backend producing speaker turns for a whole decoded file
pub trait SpeakerDiarizer: Send + Sync {
    fn diarize(&self, audio: &DecodedAudio) -> Result<Vec<SpeakerTurn>, DiarizationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_label_format() {
        assert_eq!(speaker_label(0), "SPEAKER_00");
        assert_eq!(speaker_label(7), "SPEAKER_07");
        assert_eq!(speaker_label(12), "SPEAKER_12");
    }
}
