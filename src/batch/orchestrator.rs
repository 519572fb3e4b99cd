// BatchOrchestrator - drives a whole run
//
// acquire context -> resolve input -> for each file, in order:
// transcribe -> annotate (optional) -> subtitles (optional) -> persist.
// Files are processed one at a time; a failing file never stops the run.

use std::sync::Arc;
use std::time::Instant;
use anyhow::Result;
use log::{error, info, warn};

use super::summary::{FileOutcome, RunSummary};
use crate::audio::{AudioDecoder, FfmpegDecoder};
use crate::config::RunConfig;
use crate::diarization::{annotate, unannotated};
use crate::errors::{BatchError, InputError};
use crate::file_io::OutputWriter;
use crate::input::{HttpFetcher, InputResolver, MediaFetcher, MediaFile};
use crate::models::{LocalModelLoader, ModelContext, ModelLoader};
use crate::subtitles::SubtitleTrack;
use crate::transcription::{transcribe, TranscriptionOptions, TranscriptionResult};

pub struct BatchOrchestrator {
    config: Arc<RunConfig>,
    loader: Arc<dyn ModelLoader>,
    fetcher: Arc<dyn MediaFetcher>,
    decoder: Arc<dyn AudioDecoder>,
}

impl BatchOrchestrator {
    /// Orchestrator backed by local Whisper/pyannote models, HTTP downloads and ffmpeg
    pub fn new(config: RunConfig) -> Result<Self> {
        let loader = LocalModelLoader::new(config.models_dir.clone(), config.hf_token.clone())?;
        let fetcher = HttpFetcher::new(config.hf_token.clone())?;
        let decoder = match &config.ffmpeg_path {
            Some(path) => FfmpegDecoder::with_ffmpeg_path(path.clone()),
            None => FfmpegDecoder::new(),
        };

        Ok(Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            fetcher: Arc::new(fetcher),
            decoder: Arc::new(decoder),
        })
    }

    /// Orchestrator over explicit collaborators
    pub fn from_parts(
        config: RunConfig,
        loader: Arc<dyn ModelLoader>,
        fetcher: Arc<dyn MediaFetcher>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            loader,
            fetcher,
            decoder,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the batch described by `input`.
    ///
    /// Returns `Err` only for whole-run failures detected before any file is
    /// processed (missing credential, invalid input). An input that resolves to
    /// nothing comes back as a halted summary.
    pub async fn run(&self, input: &str) -> Result<RunSummary, BatchError> {
        let started = Instant::now();
        let config = &self.config;

        // Credential check happens before any download or resolution work
        let ctx = ModelContext::acquire(
            config.device,
            &config.model,
            config.annotate,
            config.hf_token.as_deref(),
            self.loader.clone(),
        )?
        .with_decoder(self.decoder.clone());

        let mut run_warnings = Vec::new();
        if let Some(reason) = &ctx.device().fallback_reason {
            run_warnings.push(format!("device '{}' unavailable, using cpu: {}", ctx.device().requested, reason));
        }

        let resolver = InputResolver::new(config.cache_dir.clone(), self.fetcher.clone());
        let resolution = match resolver.resolve(input).await {
            Ok(resolution) => resolution,
            Err(e @ InputError::NoInput(_)) => {
                warn!("{}", e);
                return Ok(RunSummary::halted(e.into(), run_warnings, started.elapsed()));
            }
            Err(e) => {
                error!("{}", e);
                return Err(e.into());
            }
        };
        run_warnings.extend(resolution.warnings);

        let total = resolution.files.len();
        info!("Processing {} files with model '{}' on {}", total, ctx.model_id(), ctx.device().resolved);

        let mut writer = OutputWriter::new(config.output_dir.clone());
        let mut outcomes = Vec::with_capacity(total);

        for (index, media) in resolution.files.into_iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, media.display_name);
            outcomes.push(self.process_file(media, &ctx, &mut writer).await);
        }

        let summary = RunSummary {
            outcomes,
            warnings: run_warnings,
            halted: None,
            elapsed: started.elapsed(),
        };
        info!(
            "Run finished: {} succeeded, {} failed in {:.1}s",
            summary.succeeded(),
            summary.failed(),
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    async fn process_file(&self, media: MediaFile, ctx: &ModelContext, writer: &mut OutputWriter) -> FileOutcome {
        let started = Instant::now();
        let config = &self.config;
        let mut warnings = Vec::new();

        let options = TranscriptionOptions {
            language: config.language.clone(),
            translate: config.translate,
            verbose: config.verbose,
        };

        let transcript = match transcribe(&media, ctx, &options).await {
            Ok(transcript) => transcript,
            Err(e) => {
                error!("Failed to transcribe {}: {}", media.display_name, e);
                return FileOutcome::failed(media, e.to_string(), warnings, started.elapsed());
            }
        };

        let (segments, speaker_turns) = if config.annotate {
            let outcome = annotate(transcript.segments, &media, &transcript.audio, ctx).await;
            match outcome.warning {
                Some(warning) => {
                    warnings.push(format!("speaker annotation skipped: {}", warning));
                    (outcome.segments, None)
                }
                None => (outcome.segments, Some(outcome.turns)),
            }
        } else {
            (unannotated(transcript.segments), None)
        };

        let subtitles = if config.subtitle {
            let track = SubtitleTrack::from_segments(&segments, config.sub_length);
            if track.is_empty() {
                warnings.push("no words to subtitle; subtitle files are empty".to_string());
            }
            Some(track)
        } else {
            None
        };

        let result = TranscriptionResult {
            media,
            model: transcript.model,
            language: transcript.language,
            duration_secs: transcript.duration_secs,
            segments,
            speaker_turns,
            subtitles,
        };

        let artifacts = writer.persist(&result, config);
        for failure in &artifacts.failures {
            warnings.push(format!("{} artifact not written: {}", failure.kind, failure.error));
        }

        let paths = artifacts.written.into_iter().map(|a| a.path).collect();
        FileOutcome::succeeded(result.media, result.segments.len(), paths, warnings, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use tempfile::{tempdir, TempDir};
    use crate::batch::FileStatus;
    use crate::diarization::{SpeakerDiarizer, SpeakerTurn};
    use crate::errors::{ContextError, DiarizationError};
    use crate::test_support::{segment, FakeDecoder, FakeDiarizer, FakeFetcher, FakeLoader, FakeRecognizer};
    use crate::transcription::SpeechRecognizer;

    fn touch(path: &Path) {
        fs::write(path, b"media").unwrap();
    }

    fn config_in(dir: &TempDir) -> RunConfig {
        RunConfig {
            output_dir: dir.path().join("out"),
            cache_dir: dir.path().join("cache"),
            models_dir: dir.path().join("models"),
            ..RunConfig::default()
        }
    }

    fn orchestrator(config: RunConfig, loader: Arc<FakeLoader>, fetcher: Arc<FakeFetcher>) -> BatchOrchestrator {
        BatchOrchestrator::from_parts(config, loader, fetcher, Arc::new(FakeDecoder))
    }

    fn two_segments() -> Vec<crate::transcription::TranscriptionSegment> {
        vec![segment(0.0, 2.0, "hello there"), segment(2.0, 4.0, "general kenobi")]
    }

    #[tokio::test]
    async fn test_failing_file_does_not_stop_the_run() {
        let dir = tempdir().unwrap();
        let media_dir = dir.path().join("media");
        fs::create_dir_all(&media_dir).unwrap();
        for name in ["a.mp3", "b_corrupt.mp4", "c.wav"] {
            touch(&media_dir.join(name));
        }

        let loader = Arc::new(FakeLoader::with_segments(two_segments()));
        let orchestrator = orchestrator(config_in(&dir), loader.clone(), Arc::new(FakeFetcher::default()));

        let summary = orchestrator.run(&media_dir.to_string_lossy()).await.unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.exit_code(), 1);

        let failed = summary.outcome_for("b_corrupt.mp4").unwrap();
        assert!(matches!(&failed.status, FileStatus::Failed { reason } if reason.contains("decode")));

        assert!(dir.path().join("out/a/a.txt").exists());
        assert!(dir.path().join("out/c/c.json").exists());
        assert!(!dir.path().join("out/b_corrupt").exists());
        assert_eq!(loader.recognizer_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_artifacts_for_annotated_subtitled_run() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("talk.mp3");
        touch(&file);

        let diarizer: Arc<dyn SpeakerDiarizer> = Arc::new(FakeDiarizer {
            result: Ok(vec![
                SpeakerTurn::new("SPEAKER_00", 0.0, 2.1),
                SpeakerTurn::new("SPEAKER_01", 2.1, 4.0),
            ]),
        });
        let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(FakeRecognizer::new(two_segments()));
        let loader = Arc::new(FakeLoader::new(Some(recognizer), Some(diarizer)));

        let config = RunConfig {
            annotate: true,
            subtitle: true,
            sub_length: 3,
            hf_token: Some("hf_test".to_string()),
            ..config_in(&dir)
        };
        let summary = orchestrator(config, loader, Arc::new(FakeFetcher::default()))
            .run(&file.to_string_lossy())
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), 0);
        let outcome = &summary.outcomes[0];
        assert!(outcome.warnings.is_empty());
        match &outcome.status {
            FileStatus::Succeeded { segments, artifacts } => {
                assert_eq!(*segments, 2);
                assert_eq!(artifacts.len(), 5);
            }
            other => panic!("unexpected status {:?}", other),
        }

        let out = dir.path().join("out/talk");
        let text = fs::read_to_string(out.join("talk.txt")).unwrap();
        assert!(text.contains("[SPEAKER_00] hello there"));
        assert!(text.contains("[SPEAKER_01] general kenobi"));

        let rttm = fs::read_to_string(out.join("talk.rttm")).unwrap();
        assert_eq!(rttm.lines().count(), 2);

        // 4 words in blocks of 3
        let srt = fs::read_to_string(out.join("talk.srt")).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> "));
        assert!(srt.contains("\n2\n"));
        assert!(!srt.contains("\n3\n"));
        assert!(fs::read_to_string(out.join("talk.vtt")).unwrap().starts_with("WEBVTT"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("talk.json")).unwrap()).unwrap();
        assert_eq!(json["model"], "fake-asr");
        assert_eq!(json["annotated"], true);
    }

    #[tokio::test]
    async fn test_failed_diarization_degrades_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("talk.mp3");
        touch(&file);

        let diarizer: Arc<dyn SpeakerDiarizer> = Arc::new(FakeDiarizer {
            result: Err(DiarizationError::Inference("embedding failed".to_string())),
        });
        let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(FakeRecognizer::new(two_segments()));
        let loader = Arc::new(FakeLoader::new(Some(recognizer), Some(diarizer)));

        let config = RunConfig {
            annotate: true,
            hf_token: Some("hf_test".to_string()),
            ..config_in(&dir)
        };
        let summary = orchestrator(config, loader, Arc::new(FakeFetcher::default()))
            .run(&file.to_string_lossy())
            .await
            .unwrap();

        let outcome = &summary.outcomes[0];
        assert!(outcome.is_success());
        assert!(outcome.warnings[0].contains("embedding failed"));
        assert!(!dir.path().join("out/talk/talk.rttm").exists());
        assert!(dir.path().join("out/talk/talk.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_credential_halts_before_any_download() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::default());
        let loader = Arc::new(FakeLoader::with_segments(two_segments()));

        let config = RunConfig {
            annotate: true,
            hf_token: None,
            ..config_in(&dir)
        };
        let result = orchestrator(config, loader.clone(), fetcher.clone())
            .run("https://example.com/episode.mp3")
            .await;

        assert!(matches!(result, Err(BatchError::Context(ContextError::MissingCredential))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(loader.recognizer_loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nested_manifest_halts_before_processing() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("one.mp3"));
        fs::write(dir.path().join("inner.list"), "one.mp3\n").unwrap();
        let outer = dir.path().join("outer.list");
        fs::write(&outer, "one.mp3\ninner.list\n").unwrap();

        let loader = Arc::new(FakeLoader::with_segments(two_segments()));
        let result = orchestrator(config_in(&dir), loader.clone(), Arc::new(FakeFetcher::default()))
            .run(&outer.to_string_lossy())
            .await;

        assert!(matches!(result, Err(BatchError::Input(InputError::InvalidInput(_)))));
        assert_eq!(loader.recognizer_loads.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_empty_directory_is_reported_as_no_input() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        touch(&empty.join("notes.txt"));

        let summary = orchestrator(
            config_in(&dir),
            Arc::new(FakeLoader::with_segments(two_segments())),
            Arc::new(FakeFetcher::default()),
        )
        .run(&empty.to_string_lossy())
        .await
        .unwrap();

        assert!(summary.halted.as_ref().map(BatchError::is_no_input).unwrap_or(false));
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_same_stem_gets_distinct_folders() {
        let dir = tempdir().unwrap();
        for sub in ["x", "y"] {
            fs::create_dir_all(dir.path().join("media").join(sub)).unwrap();
            touch(&dir.path().join("media").join(sub).join("talk.mp3"));
        }

        let summary = orchestrator(
            config_in(&dir),
            Arc::new(FakeLoader::with_segments(two_segments())),
            Arc::new(FakeFetcher::default()),
        )
        .run(&dir.path().join("media").to_string_lossy())
        .await
        .unwrap();

        assert_eq!(summary.succeeded(), 2);
        assert!(dir.path().join("out/talk/talk.txt").exists());
        assert!(dir.path().join("out/talk_2/talk_2.txt").exists());
    }

    #[tokio::test]
    async fn test_translate_and_language_reach_the_recognizer() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("talk.mp3");
        touch(&file);

        let recognizer = Arc::new(FakeRecognizer::new(two_segments()));
        let loader = Arc::new(FakeLoader::new(Some(recognizer.clone() as Arc<dyn SpeechRecognizer>), None));

        let config = RunConfig {
            translate: true,
            language: Some("de".to_string()),
            ..config_in(&dir)
        };
        orchestrator(config, loader, Arc::new(FakeFetcher::default()))
            .run(&file.to_string_lossy())
            .await
            .unwrap();

        let requests = recognizer.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].translate);
        assert_eq!(requests[0].language.as_deref(), Some("de"));
    }
}
