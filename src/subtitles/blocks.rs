// Word chunking for subtitles
use serde::Serialize;

use crate::transcription::{AnnotatedSegment, Word};

/// Words per subtitle block when none is configured
pub const DEFAULT_WORDS_PER_BLOCK: usize = 5;

/// One timed caption: up to N consecutive words
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleBlock {
    /// 1-based cue number
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub words: Vec<Word>,
}

impl SubtitleBlock {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Partition a word stream into blocks of `words_per_block` words; the last block takes the remainder
pub fn build_blocks_from_words(words: Vec<Word>, words_per_block: usize) -> Vec<SubtitleBlock> {
    let size = words_per_block.max(1);

    words
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| SubtitleBlock {
            index: i + 1,
            start: chunk[0].start,
            end: chunk[chunk.len() - 1].end,
            words: chunk.to_vec(),
        })
        .collect()
}

/// Flatten every segment's words in order and chunk them
pub fn build_blocks(segments: &[AnnotatedSegment], words_per_block: usize) -> Vec<SubtitleBlock> {
    let words: Vec<Word> = segments
        .iter()
        .flat_map(|s| s.segment.words.iter().cloned())
        .collect();

    build_blocks_from_words(words, words_per_block)
}
