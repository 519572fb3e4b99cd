// Speaker diarization module
// Provides speaker turns for a file and merges them into transcript segments
//
// - provider.rs: SpeakerTurn and the SpeakerDiarizer trait
// - engine.rs: pyannote-rs backend (segmentation + speaker embeddings)
// - model_manager.rs: download of the pyannote ONNX models
// - merge.rs: max-overlap speaker assignment

pub mod provider;
pub mod engine;
pub mod model_manager;
pub mod merge;

pub use provider::{speaker_label, SpeakerDiarizer, SpeakerTurn};
pub use engine::{DiarizationConfig, PyannoteDiarizer};
pub use model_manager::{
    are_models_available, ensure_models_downloaded, get_model_paths,
    EMBEDDING_MODEL_NAME, SEGMENTATION_MODEL_NAME,
};
pub use merge::{annotate, assign_speakers, find_best_turn, unannotated, DiarizationOutcome};
