// Decoding media files to the PCM format expected by Whisper and pyannote

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use anyhow::{Result, anyhow};
use log::{debug, error, info};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// Windows flag to prevent console window from appearing
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Sample rate of decoded audio (Whisper's expected rate)
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Mono f32 samples for one media file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples as 16-bit PCM, the input format of pyannote-rs
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
            .collect()
    }
}

/// Turns a media file into mono 16 kHz PCM
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// Locate an ffmpeg executable: PATH first, then next to our own binary
pub fn find_ffmpeg_path() -> Option<PathBuf> {
    if let Ok(path) = which::which("ffmpeg") {
        return Some(path);
    }

    let sidecar = ffmpeg_sidecar::paths::ffmpeg_path();
    if sidecar.exists() {
        return Some(sidecar);
    }

    None
}

/// Decodes any container/codec ffmpeg understands
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecoder {
    ffmpeg_path: Option<PathBuf>,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg binary instead of searching for one
    pub fn with_ffmpeg_path(path: PathBuf) -> Self {
        Self { ffmpeg_path: Some(path) }
    }

    fn ffmpeg(&self) -> Result<PathBuf> {
        self.ffmpeg_path
            .clone()
            .or_else(find_ffmpeg_path)
            .ok_or_else(|| anyhow!("FFmpeg not found. Please install FFmpeg."))
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        if !path.exists() {
            return Err(anyhow!("Media file does not exist: {}", path.display()));
        }

        let ffmpeg_path = self.ffmpeg()?;

        info!("Decoding media file: {}", path.display());
        debug!("Using FFmpeg at: {:?}", ffmpeg_path);

        let mut command = Command::new(&ffmpeg_path);

        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        command
            .arg("-nostdin")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")           // Only errors on stderr
            .arg("-i")
            .arg(path)
            .arg("-vn")             // Drop any video stream
            .arg("-f")
            .arg("f32le")           // Output format: 32-bit float little-endian
            .arg("-acodec")
            .arg("pcm_f32le")
            .arg("-ar")
            .arg(WHISPER_SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg("1")               // Mono
            .arg("-")               // Output to stdout
            .stdin(Stdio::null());

        debug!("FFmpeg command: {:?}", command);

        // Drains stdout and stderr together so a chatty stderr cannot stall the pipe
        let output = command.output()
            .map_err(|e| anyhow!("Failed to run FFmpeg: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("unknown error");
            error!("FFmpeg decode failed for {}: {}", path.display(), last_line.trim());
            debug!("FFmpeg stderr ({} bytes): {}", output.stderr.len(), stderr);
            return Err(anyhow!("FFmpeg failed to decode {}: {}", path.display(), last_line.trim()));
        }

        let samples = samples_from_f32le(&output.stdout)?;
        if samples.is_empty() {
            return Err(anyhow!("No audio stream found in {}", path.display()));
        }

        let audio = DecodedAudio::new(samples, WHISPER_SAMPLE_RATE);
        info!("Decoded {} samples ({:.2} seconds) from {}",
              audio.samples.len(), audio.duration_secs(), path.display());

        Ok(audio)
    }
}

/// Convert raw f32le bytes to samples
pub fn samples_from_f32le(raw_bytes: &[u8]) -> Result<Vec<f32>> {
    if raw_bytes.len() % 4 != 0 {
        return Err(anyhow!("Invalid audio data length: {} bytes (not divisible by 4)", raw_bytes.len()));
    }

    Ok(raw_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
