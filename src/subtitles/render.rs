// SubRip and WebVTT rendering
//
// Both encodings are rendered from the same block list so cue boundaries and
// text always agree; only the timestamp syntax and container differ.

use super::blocks::{build_blocks, SubtitleBlock};
use crate::transcription::AnnotatedSegment;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleTrack {
    pub blocks: Vec<SubtitleBlock>,
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    (hours, minutes, secs, millis)
}

/// HH:MM:SS,mmm
pub fn format_srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// HH:MM:SS.mmm
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

impl SubtitleTrack {
    pub fn new(blocks: Vec<SubtitleBlock>) -> Self {
        Self { blocks }
    }

    pub fn from_segments(segments: &[AnnotatedSegment], words_per_block: usize) -> Self {
        Self::new(build_blocks(segments, words_per_block))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                block.index,
                format_srt_timestamp(block.start),
                format_srt_timestamp(block.end),
                block.text()
            ));
        }
        out
    }

    pub fn to_webvtt(&self) -> String {
        let mut out = String::from("WEBVTT\n\n");
        for block in &self.blocks {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                block.index,
                format_vtt_timestamp(block.start),
                format_vtt_timestamp(block.end),
                block.text()
            ));
        }
        out
    }
}
