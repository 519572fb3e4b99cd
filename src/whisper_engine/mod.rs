// Whisper Engine Module
//
// Split into focused files:
// - model_registry.rs: Known models, file names and validation
// - downloader.rs: Model downloading
// - model_loader.rs: Model loading for the resolved device
// - recognizer.rs: WhisperRecognizer, whole-file transcription with word timings

pub mod model_registry;
pub mod downloader;
pub mod model_loader;
pub mod recognizer;

pub use model_registry::{get_model_url, is_known_model, model_path, validate_model_file, MODEL_CONFIGS};
pub use downloader::ensure_model_downloaded;
pub use model_loader::load_context;
pub use recognizer::{words_from_tokens, TokenTiming, WhisperRecognizer};
