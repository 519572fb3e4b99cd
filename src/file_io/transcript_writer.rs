// File I/O - Transcript Writer
//
// Every artifact of a file is attempted independently; one failed write is
// recorded and the remaining artifacts are still written.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use super::utils::unique_stem;
use crate::config::RunConfig;
use crate::diarization::SpeakerTurn;
use crate::errors::ArtifactWriteError;
use crate::transcription::TranscriptionResult;

const STRUCTURED_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    PlainText,
    Structured,
    Diarization,
    SubRip,
    WebVtt,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::PlainText => "txt",
            ArtifactKind::Structured => "json",
            ArtifactKind::Diarization => "rttm",
            ArtifactKind::SubRip => "srt",
            ArtifactKind::WebVtt => "vtt",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct ArtifactFailure {
    pub kind: ArtifactKind,
    pub error: ArtifactWriteError,
}

/// What persisting one file produced
#[derive(Debug, Default)]
pub struct WrittenArtifacts {
    pub directory: PathBuf,
    pub written: Vec<WrittenArtifact>,
    pub failures: Vec<ArtifactFailure>,
}

impl WrittenArtifacts {
    pub fn path_of(&self, kind: ArtifactKind) -> Option<&Path> {
        self.written
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.path.as_path())
    }
}

/// One line per segment, prefixed with the speaker when annotation ran
pub fn render_plain_text(result: &TranscriptionResult) -> String {
    let annotated = result.speaker_turns.is_some();
    let mut out = String::new();

    for segment in &result.segments {
        if annotated {
            out.push_str(&format!("[{}] ", segment.speaker));
        }
        out.push_str(segment.segment.text.trim());
        out.push('\n');
    }

    out
}

/// Pretty JSON with full segment, word and speaker detail
pub fn render_structured(result: &TranscriptionResult, config: &RunConfig) -> Result<String, ArtifactWriteError> {
    let document = json!({
        "version": STRUCTURED_FORMAT_VERSION,
        "created_at": Utc::now().to_rfc3339(),
        "source": result.media.source,
        "media_path": result.media.path,
        "origin": result.media.origin,
        "model": result.model,
        "language": result.language,
        "translated": config.translate,
        "duration": result.duration_secs,
        "annotated": result.speaker_turns.is_some(),
        "segments": result.segments,
    });

    Ok(serde_json::to_string_pretty(&document)?)
}

/// RTTM speaker records, one line per turn
pub fn render_rttm(file_id: &str, turns: &[SpeakerTurn]) -> String {
    let file_id: String = file_id
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    turns
        .iter()
        .map(|turn| {
            format!(
                "SPEAKER {} 1 {:.3} {:.3} <NA> <NA> {} <NA> <NA>\n",
                file_id,
                turn.start,
                turn.duration(),
                turn.speaker
            )
        })
        .collect()
}

/// Writes per-file artifact directories under the run's output directory
pub struct OutputWriter {
    output_dir: PathBuf,
    used_names: HashSet<String>,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            used_names: HashSet::new(),
        }
    }

    /// Persist every artifact for one file. Never fails as a whole.
    pub fn persist(&mut self, result: &TranscriptionResult, config: &RunConfig) -> WrittenArtifacts {
        let stem = unique_stem(&result.media.stem(), &mut self.used_names);
        let directory = self.output_dir.join(&stem);

        let mut artifacts: Vec<(ArtifactKind, Result<String, ArtifactWriteError>)> = vec![
            (ArtifactKind::PlainText, Ok(render_plain_text(result))),
            (ArtifactKind::Structured, render_structured(result, config)),
        ];
        if let Some(turns) = &result.speaker_turns {
            artifacts.push((ArtifactKind::Diarization, Ok(render_rttm(&stem, turns))));
        }
        if let Some(track) = &result.subtitles {
            artifacts.push((ArtifactKind::SubRip, Ok(track.to_srt())));
            artifacts.push((ArtifactKind::WebVtt, Ok(track.to_webvtt())));
        }

        let mut outcome = WrittenArtifacts {
            directory: directory.clone(),
            ..Default::default()
        };

        if let Err(source) = std::fs::create_dir_all(&directory) {
            warn!("Failed to create output directory {}: {}", directory.display(), source);
            for (kind, _) in artifacts {
                outcome.failures.push(ArtifactFailure {
                    kind,
                    error: ArtifactWriteError::CreateDir {
                        path: directory.clone(),
                        source: std::io::Error::new(source.kind(), source.to_string()),
                    },
                });
            }
            return outcome;
        }

        for (kind, content) in artifacts {
            let path = directory.join(format!("{}.{}", stem, kind.extension()));
            let written = content.and_then(|content| {
                std::fs::write(&path, content).map_err(|source| ArtifactWriteError::Io {
                    path: path.clone(),
                    source,
                })
            });

            match written {
                Ok(()) => {
                    debug!("Wrote {}", path.display());
                    outcome.written.push(WrittenArtifact { kind, path });
                }
                Err(error) => {
                    warn!("Failed to write {} artifact for {}: {}", kind, result.media.display_name, error);
                    outcome.failures.push(ArtifactFailure { kind, error });
                }
            }
        }

        info!(
            "Saved {} artifacts for {} to {}",
            outcome.written.len(),
            result.media.display_name,
            directory.display()
        );
        outcome
    }
}
