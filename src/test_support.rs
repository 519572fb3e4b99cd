// In-memory doubles for the inference seams, shared by unit tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::audio::{AudioDecoder, DecodedAudio, WHISPER_SAMPLE_RATE};
use crate::diarization::{SpeakerDiarizer, SpeakerTurn};
use crate::errors::{DiarizationError, TranscriptionError};
use crate::input::{MediaFile, MediaOrigin};
use crate::models::{DeviceSelection, ModelLoader};
use crate::transcription::{Recognition, RecognitionRequest, SpeechRecognizer, TranscriptionSegment, Word};

/// Segment whose words are spread evenly over its span
pub fn segment(start: f64, end: f64, text: &str) -> TranscriptionSegment {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let step = if tokens.is_empty() { 0.0 } else { (end - start) / tokens.len() as f64 };
    let words = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| Word::new(*t, start + step * i as f64, start + step * (i + 1) as f64))
        .collect();
    TranscriptionSegment::new(start, end, text, words)
}

pub fn media(path: &str) -> MediaFile {
    let path = PathBuf::from(path);
    MediaFile {
        display_name: path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
        source: path.to_string_lossy().to_string(),
        path,
        origin: MediaOrigin::LocalFile,
    }
}

/// Decoder returning one second of silence, failing for paths containing "corrupt"
#[derive(Default)]
pub struct FakeDecoder;

impl AudioDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        if path.to_string_lossy().contains("corrupt") {
            return Err(anyhow!("Invalid data found when processing input"));
        }
        Ok(DecodedAudio::new(vec![0.0; WHISPER_SAMPLE_RATE as usize], WHISPER_SAMPLE_RATE))
    }
}

/// Recognizer returning fixed segments and recording every request
pub struct FakeRecognizer {
    pub segments: Vec<TranscriptionSegment>,
    pub language: Option<String>,
    pub requests: Mutex<Vec<RecognitionRequest>>,
}

impl FakeRecognizer {
    pub fn new(segments: Vec<TranscriptionSegment>) -> Self {
        Self {
            segments,
            language: Some("en".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn recognize(&self, _audio: &DecodedAudio, request: &RecognitionRequest) -> Result<Recognition, TranscriptionError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Recognition {
            segments: self.segments.clone(),
            language: request.language.clone().or_else(|| self.language.clone()),
        })
    }

    fn name(&self) -> &str {
        "fake-asr"
    }
}

/// Diarizer returning fixed turns, or a fixed error
pub struct FakeDiarizer {
    pub result: Result<Vec<SpeakerTurn>, DiarizationError>,
}

impl SpeakerDiarizer for FakeDiarizer {
    fn diarize(&self, _audio: &DecodedAudio) -> Result<Vec<SpeakerTurn>, DiarizationError> {
        self.result.clone()
    }
}

/// Loader handing out the doubles above and counting load calls
pub struct FakeLoader {
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub diarizer: Option<Arc<dyn SpeakerDiarizer>>,
    pub recognizer_loads: AtomicUsize,
    pub diarizer_loads: AtomicUsize,
}

impl FakeLoader {
    pub fn new(recognizer: Option<Arc<dyn SpeechRecognizer>>, diarizer: Option<Arc<dyn SpeakerDiarizer>>) -> Self {
        Self {
            recognizer,
            diarizer,
            recognizer_loads: AtomicUsize::new(0),
            diarizer_loads: AtomicUsize::new(0),
        }
    }

    pub fn with_segments(segments: Vec<TranscriptionSegment>) -> Self {
        let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(FakeRecognizer::new(segments));
        Self::new(Some(recognizer), None)
    }
}

#[async_trait]
impl ModelLoader for FakeLoader {
    async fn load_recognizer(&self, model_id: &str, _device: &DeviceSelection) -> Result<Arc<dyn SpeechRecognizer>> {
        self.recognizer_loads.fetch_add(1, Ordering::SeqCst);
        self.recognizer
            .clone()
            .ok_or_else(|| anyhow!("model {} could not be loaded", model_id))
    }

    async fn load_diarizer(&self, _device: &DeviceSelection) -> Result<Arc<dyn SpeakerDiarizer>> {
        self.diarizer_loads.fetch_add(1, Ordering::SeqCst);
        self.diarizer
            .clone()
            .ok_or_else(|| anyhow!("diarization pipeline could not be loaded"))
    }
}

/// Fetcher serving pre-seeded URLs and counting calls
#[derive(Default)]
pub struct FakeFetcher {
    pub files: HashMap<String, PathBuf>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl crate::input::MediaFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _cache_dir: &Path) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("Download of {} failed with status: 404 Not Found", url))
    }
}

/// One canned HTTP response: request path (with query), Content-Type, body
pub type Route = (&'static str, &'static str, &'static str);

/// Local HTTP/1.1 server answering the given routes and 404 for anything else
pub struct TestServer {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn serve(routes: Vec<Route>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = match routes.iter().find(|(p, _, _)| *p == path) {
                    Some((_, content_type, body)) => {
                        let mut response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            content_type,
                            body.len()
                        )
                        .into_bytes();
                        response.extend_from_slice(body.as_bytes());
                        response
                    }
                    None => b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
                };

                let _ = stream.write_all(&response).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        hits,
    }
}

/// Client that ignores proxy settings, for talking to `serve`
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
