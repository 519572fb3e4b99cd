// Whisper Engine - whole-file recognition with word timings
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperState};
use log::{debug, info, warn};

use crate::audio::DecodedAudio;
use crate::errors::TranscriptionError;
use crate::models::DecodingConfig;
use crate::transcription::{Recognition, RecognitionRequest, SpeechRecognizer, TranscriptionSegment, Word};

/// One decoded token with its timing in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub probability: f32,
}

/// whisper.cpp timestamps are in centiseconds
fn centis_to_secs(t: i64) -> f64 {
    t.max(0) as f64 / 100.0
}

/// Special tokens ([_BEG_], <|endoftext|>, ...) carry no text
fn is_special_token(text: &str) -> bool {
    text.starts_with("[_") || text.starts_with("<|")
}

/// Group sub-word tokens into words. A token starting with a space opens a new word.
pub fn words_from_tokens(tokens: &[TokenTiming]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut probabilities: Vec<Vec<f32>> = Vec::new();

    for token in tokens {
        if is_special_token(&token.text) {
            continue;
        }

        let starts_word = token.text.starts_with(' ') || words.is_empty();
        let piece = token.text.trim();

        if starts_word {
            if piece.is_empty() {
                continue;
            }
            words.push(Word::new(piece, token.start, token.end));
            probabilities.push(vec![token.probability]);
        } else if let (Some(word), Some(probs)) = (words.last_mut(), probabilities.last_mut()) {
            word.text.push_str(piece);
            word.end = word.end.max(token.end);
            probs.push(token.probability);
        }
    }

    for (word, probs) in words.iter_mut().zip(probabilities) {
        word.confidence = Some(probs.iter().sum::<f32>() / probs.len() as f32);
    }

    words
}

/// whisper.cpp backed recognizer, one loaded model per run
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    model_name: String,
    decoding: DecodingConfig,
}

impl WhisperRecognizer {
    pub fn new(ctx: WhisperContext, model_name: impl Into<String>, decoding: DecodingConfig) -> Self {
        Self {
            ctx,
            model_name: model_name.into(),
            decoding,
        }
    }

    fn read_segments(state: &WhisperState) -> Result<Vec<TranscriptionSegment>, TranscriptionError> {
        let num_segments = state.full_n_segments().map_err(inference_error)?;
        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);

        for i in 0..num_segments {
            let text = match state.full_get_segment_text_lossy(i) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping unreadable segment {}: {}", i, e);
                    continue;
                }
            };
            let start = centis_to_secs(state.full_get_segment_t0(i).unwrap_or(0));
            let end = centis_to_secs(state.full_get_segment_t1(i).unwrap_or(0));

            let num_tokens = state.full_n_tokens(i).unwrap_or(0);
            let mut tokens = Vec::with_capacity(num_tokens.max(0) as usize);
            for j in 0..num_tokens {
                let (Ok(token_text), Ok(data)) = (
                    state.full_get_token_text_lossy(i, j),
                    state.full_get_token_data(i, j),
                ) else {
                    continue;
                };
                tokens.push(TokenTiming {
                    text: token_text,
                    start: centis_to_secs(data.t0),
                    end: centis_to_secs(data.t1),
                    probability: data.p,
                });
            }

            perf_trace!("Segment {} ({:.2}s-{:.2}s): '{}'", i, start, end, text);
            segments.push(TranscriptionSegment::new(start, end, text.trim(), words_from_tokens(&tokens)));
        }

        Ok(segments)
    }
}

fn inference_error(e: impl std::fmt::Display) -> TranscriptionError {
    TranscriptionError::Inference(e.to_string())
}

impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(
        &self,
        audio: &DecodedAudio,
        request: &RecognitionRequest,
    ) -> Result<Recognition, TranscriptionError> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: self.decoding.beam_size as i32,
            patience: 1.0,
        });

        let language = request.language.as_deref().unwrap_or("auto");
        params.set_language(Some(language));
        params.set_translate(request.translate);
        params.set_n_threads(self.decoding.threads.max(1) as i32);
        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_non_speech_tokens(true);
        params.set_temperature(self.decoding.temperature);
        params.set_entropy_thold(2.4);
        params.set_logprob_thold(-1.0);
        params.set_no_speech_thold(0.55);
        params.set_single_segment(false);

        info!(
            "Running {} on {:.1}s of audio (language: {}, translate: {}, beam: {})",
            self.model_name,
            audio.duration_secs(),
            language,
            request.translate,
            self.decoding.beam_size
        );

        let mut state = self.ctx.create_state().map_err(inference_error)?;
        state.full(params, &audio.samples).map_err(inference_error)?;

        let segments = Self::read_segments(&state)?;

        // Detection failure is not fatal; the transcript simply carries no language
        let detected = match request.language.clone() {
            Some(lang) => Some(lang),
            None => match state.full_lang_id_from_state() {
                Ok(id) => whisper_rs::get_lang_str(id).map(str::to_string),
                Err(e) => {
                    warn!("Language detection failed: {}", e);
                    None
                }
            },
        };

        debug!("Whisper produced {} segments (language: {:?})", segments.len(), detected);
        Ok(Recognition {
            segments,
            language: detected,
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, start: f64, end: f64, probability: f32) -> TokenTiming {
        TokenTiming {
            text: text.to_string(),
            start,
            end,
            probability,
        }
    }

    #[test]
    fn test_subword_tokens_are_joined() {
        let tokens = vec![
            token("[_BEG_]", 0.0, 0.0, 1.0),
            token(" Hel", 0.0, 0.2, 0.8),
            token("lo", 0.2, 0.4, 0.6),
            token(" world", 0.5, 0.9, 0.9),
            token("<|endoftext|>", 0.9, 0.9, 1.0),
        ];

        let words = words_from_tokens(&tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].start, 0.0);
        assert_eq!(words[0].end, 0.4);
        assert!((words[0].confidence.unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(words[1].text, "world");
    }

    #[test]
    fn test_leading_token_without_space_starts_a_word() {
        let words = words_from_tokens(&[token("Bonjour", 0.0, 0.5, 1.0), token(",", 0.5, 0.6, 1.0)]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Bonjour,");
    }

    #[test]
    fn test_centiseconds() {
        assert_eq!(centis_to_secs(250), 2.5);
        assert_eq!(centis_to_secs(-5), 0.0);
    }
}
