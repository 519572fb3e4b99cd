// Command-line arguments
//
// Every option is optional (or a presence flag) so the merge can tell an
// explicitly given value from one that should come from the config file.

use std::path::PathBuf;
use clap::Parser;

use crate::models::Device;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "mediascribe",
    author,
    version,
    about = "Batch transcription, translation, speaker annotation and subtitling of audio and video files.",
    long_about = "Transcribe a file, a directory, a URL or a .list manifest of media files with Whisper. \
                  Each file gets its own output folder with a plain-text and a JSON transcript, plus \
                  an RTTM speaker record (--annotate) and SRT/WebVTT subtitles (--subtitle)."
)]
pub struct Args {
    /// Path to a media file, a directory, a URL or a .list manifest
    #[arg(short, long)]
    pub files: Option<String>,

    /// Folder where transcripts are saved [default: ./transcriptions]
    #[arg(short, long = "output_dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compute device [default: cpu]
    #[arg(short, long, value_enum)]
    pub device: Option<Device>,

    /// Whisper model to use [default: large-v2]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Language code of the spoken audio (e.g. "en", "de"). Detected when omitted.
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Annotate speakers (requires a Hugging Face access token)
    #[arg(short, long)]
    pub annotate: bool,

    /// Hugging Face access token used for speaker annotation and model downloads
    #[arg(long = "hf_token", env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Translate the transcript to English
    #[arg(short, long)]
    pub translate: bool,

    /// Create .srt and .vtt subtitles
    #[arg(short, long)]
    pub subtitle: bool,

    /// Words per subtitle block [default: 5]
    #[arg(long = "sub_length", value_name = "N")]
    pub sub_length: Option<usize>,

    /// JSON config file providing any of these options
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List the supported file types and exit
    #[arg(long)]
    pub filetypes: bool,

    /// Print transcript text while processing
    #[arg(short, long)]
    pub verbose: bool,

    /// Folder holding Whisper and diarization models
    #[arg(long = "models_dir", value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Folder for downloaded media [default: <output_dir>/.downloads]
    #[arg(long = "cache_dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// ffmpeg executable [default: found on PATH or next to this binary]
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,
}
