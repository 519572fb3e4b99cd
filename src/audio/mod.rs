// Audio Module
//
// - decoder.rs: AudioDecoder trait and the ffmpeg-backed implementation

pub mod decoder;

pub use decoder::{AudioDecoder, DecodedAudio, FfmpegDecoder, find_ffmpeg_path, WHISPER_SAMPLE_RATE};
