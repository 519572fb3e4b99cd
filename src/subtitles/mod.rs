// Subtitle generation
//
// - blocks.rs: fixed-size word chunking into SubtitleBlocks
// - render.rs: SubtitleTrack and its SubRip / WebVTT renderings

pub mod blocks;
pub mod render;

pub use blocks::{build_blocks, build_blocks_from_words, SubtitleBlock, DEFAULT_WORDS_PER_BLOCK};
pub use render::{format_srt_timestamp, format_vtt_timestamp, SubtitleTrack};
