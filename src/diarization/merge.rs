// Merging speaker turns into transcript segments
//
// Each segment gets the label of the turn it overlaps the most. A segment is
// never split across speakers.

use std::cmp::Ordering;
use log::{debug, info, warn};

use super::provider::SpeakerTurn;
use crate::audio::DecodedAudio;
use crate::errors::DiarizationError;
use crate::input::MediaFile;
use crate::models::ModelContext;
use crate::transcription::{AnnotatedSegment, TranscriptionSegment};

/// Result of the annotation stage for one file
#[derive(Debug, Clone)]
pub struct DiarizationOutcome {
    pub segments: Vec<AnnotatedSegment>,
    /// Turns sorted by start time; empty when diarization degraded
    pub turns: Vec<SpeakerTurn>,
    /// Set when diarization could not run and every segment is "unknown"
    pub warning: Option<DiarizationError>,
}

/// Temporal overlap of two spans, never negative
pub fn overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// Find the turn with maximum overlap with [start, end].
/// Ties go to the turn that starts first. Zero overlap never matches.
pub fn find_best_turn(turns: &[SpeakerTurn], start: f64, end: f64) -> Option<&SpeakerTurn> {
    let mut best: Option<(&SpeakerTurn, f64)> = None;

    for turn in turns {
        let amount = overlap(start, end, turn.start, turn.end);
        if amount <= 0.0 {
            continue;
        }

        best = match best {
            None => Some((turn, amount)),
            Some((current, current_amount)) => match amount.total_cmp(&current_amount) {
                Ordering::Greater => Some((turn, amount)),
                Ordering::Equal if turn.start < current.start => Some((turn, amount)),
                _ => Some((current, current_amount)),
            },
        };
    }

    best.map(|(turn, _)| turn)
}

/// Label every segment with its best-overlapping speaker, or "unknown"
pub fn assign_speakers(segments: Vec<TranscriptionSegment>, turns: &[SpeakerTurn]) -> Vec<AnnotatedSegment> {
    segments
        .into_iter()
        .map(|segment| match find_best_turn(turns, segment.start, segment.end) {
            Some(turn) => {
                debug!(
                    "Segment [{:.1}s-{:.1}s] assigned to {}",
                    segment.start, segment.end, turn.speaker
                );
                let speaker = turn.speaker.clone();
                AnnotatedSegment { segment, speaker }
            }
            None => AnnotatedSegment::unknown(segment),
        })
        .collect()
}

/// Label every segment "unknown" (annotation not requested)
pub fn unannotated(segments: Vec<TranscriptionSegment>) -> Vec<AnnotatedSegment> {
    segments.into_iter().map(AnnotatedSegment::unknown).collect()
}

/// Run diarization for one file and merge the turns into its segments.
///
/// Diarization problems never fail the file: the segments come back labelled
/// "unknown" and the cause is returned as a warning.
pub async fn annotate(
    segments: Vec<TranscriptionSegment>,
    media: &MediaFile,
    audio: &DecodedAudio,
    ctx: &ModelContext,
) -> DiarizationOutcome {
    let diarized = match ctx.diarizer().await {
        Ok(diarizer) => diarizer.diarize(audio),
        Err(e) => Err(e),
    };

    let mut turns = match diarized {
        Ok(turns) if turns.is_empty() => return degraded(segments, media, DiarizationError::NoSpeech),
        Ok(turns) => turns,
        Err(e) => return degraded(segments, media, e),
    };

    turns.sort_by(|a, b| a.start.total_cmp(&b.start));

    let segments = assign_speakers(segments, &turns);
    let labelled = segments.iter().filter(|s| !s.is_unknown()).count();
    info!(
        "Annotated {}/{} segments of {} from {} speaker turns",
        labelled,
        segments.len(),
        media.display_name,
        turns.len()
    );

    DiarizationOutcome {
        segments,
        turns,
        warning: None,
    }
}

fn degraded(segments: Vec<TranscriptionSegment>, media: &MediaFile, error: DiarizationError) -> DiarizationOutcome {
    warn!("Speaker annotation degraded for {}: {}", media.display_name, error);
    DiarizationOutcome {
        segments: unannotated(segments),
        turns: Vec::new(),
        warning: Some(error),
    }
}
