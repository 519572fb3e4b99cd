// Per-file transcription
//
// Decodes the media once, runs the shared ASR model and normalizes whatever
// timing the model returned into ordered, non-overlapping segments.

use log::{debug, info};

use super::provider::RecognitionRequest;
use super::types::{format_media_time, TranscriptionSegment, Word};
use crate::audio::DecodedAudio;
use crate::errors::TranscriptionError;
use crate::input::MediaFile;
use crate::models::ModelContext;

#[derive(Debug, Clone, Default)]
pub struct TranscriptionOptions {
    pub language: Option<String>,
    pub translate: bool,
    /// Log each segment's text as soon as it is available
    pub verbose: bool,
}

/// Normalized ASR output for one file
#[derive(Debug, Clone)]
pub struct Transcript {
    pub segments: Vec<TranscriptionSegment>,
    /// Recognizer that produced the segments
    pub model: String,
    pub language: Option<String>,
    pub duration_secs: f64,
    /// Decoded audio, reused by the diarization stage
    pub audio: DecodedAudio,
}

/// Transcribe one media file with the context's ASR model
pub async fn transcribe(
    media: &MediaFile,
    ctx: &ModelContext,
    options: &TranscriptionOptions,
) -> Result<Transcript, TranscriptionError> {
    let audio = ctx
        .decoder()
        .decode(&media.path)
        .map_err(|e| TranscriptionError::Decode(format!("{:#}", e)))?;

    let recognizer = ctx.recognizer().await?;

    let request = RecognitionRequest {
        language: options.language.clone(),
        translate: options.translate,
    };
    let recognition = recognizer.recognize(&audio, &request)?;

    let raw_count = recognition.segments.len();
    let segments = normalize_segments(recognition.segments);
    perf_debug!("Normalized {} raw segments into {} for {}", raw_count, segments.len(), media.display_name);

    if options.verbose {
        for segment in &segments {
            info!("{} {} {}", media.display_name, format_media_time(segment.start), segment.text);
        }
    }

    info!(
        "Transcribed {} with {} ({:.1}s, {} segments, language: {})",
        media.display_name,
        recognizer.name(),
        audio.duration_secs(),
        segments.len(),
        recognition.language.as_deref().unwrap_or("unknown")
    );

    Ok(Transcript {
        segments,
        model: recognizer.name().to_string(),
        language: recognition.language,
        duration_secs: audio.duration_secs(),
        audio,
    })
}

fn clamp_time(t: f64) -> f64 {
    if t.is_finite() && t > 0.0 {
        t
    } else {
        0.0
    }
}

/// Spread words evenly over a segment that came back without word timing
fn synthesize_words(text: &str, start: f64, end: f64) -> Vec<Word> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let step = (end - start) / tokens.len() as f64;
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| Word::new(*token, start + step * i as f64, start + step * (i + 1) as f64))
        .collect()
}

/// Enforce the ordering invariants on raw model output.
///
/// Timestamps are clamped to >= 0 and end >= start, words are stably sorted
/// within their segment, segments are stably sorted by start, each segment
/// ends no later than the next one starts, and words lie inside their segment.
/// Segments without text are dropped.
pub fn normalize_segments(raw: Vec<TranscriptionSegment>) -> Vec<TranscriptionSegment> {
    let mut segments: Vec<TranscriptionSegment> = raw
        .into_iter()
        .filter_map(|mut segment| {
            segment.start = clamp_time(segment.start);
            segment.end = clamp_time(segment.end).max(segment.start);

            segment.words.retain(|w| !w.text.trim().is_empty());
            for word in &mut segment.words {
                word.text = word.text.trim().to_string();
                word.start = clamp_time(word.start);
                word.end = clamp_time(word.end).max(word.start);
            }
            segment.words.sort_by(|a, b| a.start.total_cmp(&b.start));

            segment.text = segment.text.trim().to_string();
            if segment.text.is_empty() {
                segment.text = segment
                    .words
                    .iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            if segment.text.is_empty() {
                debug!("Dropping empty segment at {:.2}s", segment.start);
                return None;
            }
            if segment.words.is_empty() {
                segment.words = synthesize_words(&segment.text, segment.start, segment.end);
            }

            Some(segment)
        })
        .collect();

    segments.sort_by(|a, b| a.start.total_cmp(&b.start));

    for i in 1..segments.len() {
        let next_start = segments[i].start;
        let previous = &mut segments[i - 1];
        if previous.end > next_start {
            perf_trace!("Truncating segment end {:.2}s to {:.2}s", previous.end, next_start);
            previous.end = next_start;
        }
    }

    for segment in &mut segments {
        let (start, end) = (segment.start, segment.end);
        for word in &mut segment.words {
            word.start = word.start.clamp(start, end);
            word.end = word.end.clamp(word.start, end);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::models::Device;
    use crate::transcription::SpeechRecognizer;
    use crate::test_support::{media, segment, FakeDecoder, FakeLoader, FakeRecognizer};

    fn assert_well_formed(segments: &[TranscriptionSegment]) {
        let mut last_start = 0.0;
        let mut last_end = 0.0;
        for seg in segments {
            assert!(seg.start >= 0.0 && seg.end >= seg.start);
            assert!(seg.start >= last_start);
            assert!(seg.start >= last_end, "segments overlap at {}", seg.start);
            last_start = seg.start;
            last_end = seg.end;

            let mut word_start = seg.start;
            for word in &seg.words {
                assert!(word.start >= word_start && word.end >= word.start);
                assert!(word.start >= seg.start && word.end <= seg.end);
                word_start = word.start;
            }
        }
    }

    #[test]
    fn test_unordered_overlapping_segments_are_fixed() {
        let raw = vec![
            segment(5.0, 9.0, "third part"),
            segment(0.0, 3.0, "first"),
            segment(2.5, 6.0, "second overlapping"),
        ];

        let segments = normalize_segments(raw);
        let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second overlapping", "third part"]);
        assert_eq!(segments[0].end, 2.5);
        assert_eq!(segments[1].end, 5.0);
        assert_well_formed(&segments);
    }

    #[test]
    fn test_negative_and_inverted_times_are_clamped() {
        let mut bad = segment(-1.0, -0.5, "early");
        bad.words[0].start = -3.0;
        let raw = vec![bad, TranscriptionSegment::new(4.0, 2.0, "backwards", Vec::new())];

        let segments = normalize_segments(raw);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 0.0);
        assert_eq!(segments[1].start, 4.0);
        assert_eq!(segments[1].end, 4.0);
        assert_well_formed(&segments);
    }

    #[test]
    fn test_words_sorted_and_text_rebuilt() {
        let words = vec![Word::new("world", 1.0, 1.5), Word::new("hello", 0.0, 0.5)];
        let raw = vec![
            TranscriptionSegment::new(0.0, 2.0, "  ", words),
            TranscriptionSegment::new(3.0, 4.0, "", Vec::new()),
        ];

        let segments = normalize_segments(raw);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].words[0].text, "hello");
        assert_eq!(segments[0].text, "hello world");
    }

    #[test]
    fn test_missing_words_are_synthesized() {
        let segments = normalize_segments(vec![TranscriptionSegment::new(0.0, 3.0, "one two three", Vec::new())]);
        let words = &segments[0].words;
        assert_eq!(words.len(), 3);
        assert_eq!(words[1].start, 1.0);
        assert_eq!(words[2].end, 3.0);
    }

    #[tokio::test]
    async fn test_transcribe_passes_language_and_translate() {
        let recognizer = Arc::new(FakeRecognizer::new(vec![segment(1.0, 2.0, "hola"), segment(0.0, 1.0, "dice")]));
        let loader = Arc::new(FakeLoader::new(Some(recognizer.clone() as Arc<dyn SpeechRecognizer>), None));
        let ctx = ModelContext::acquire(Device::Cpu, "tiny", false, None, loader)
            .unwrap()
            .with_decoder(Arc::new(FakeDecoder));

        let options = TranscriptionOptions {
            language: Some("es".to_string()),
            translate: true,
            verbose: true,
        };
        let transcript = transcribe(&media("/media/a.mp3"), &ctx, &options).await.unwrap();

        assert_eq!(transcript.language.as_deref(), Some("es"));
        assert_eq!(transcript.segments[0].text, "dice");
        assert_eq!(transcript.duration_secs, 1.0);

        let requests = recognizer.requests.lock().unwrap();
        assert_eq!(requests[0].language.as_deref(), Some("es"));
        assert!(requests[0].translate);
    }

    #[tokio::test]
    async fn test_decode_failure_is_a_transcription_error() {
        let loader = Arc::new(FakeLoader::with_segments(Vec::new()));
        let ctx = ModelContext::acquire(Device::Cpu, "tiny", false, None, loader)
            .unwrap()
            .with_decoder(Arc::new(FakeDecoder));

        let err = transcribe(&media("/media/corrupt.mp4"), &ctx, &TranscriptionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Decode(_)));
    }
}
