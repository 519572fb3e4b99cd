// File I/O Module
//
// - utils.rs: File name sanitization and output directory naming
// - transcript_writer.rs: OutputWriter, per-file artifact persistence

pub mod utils;
pub mod transcript_writer;

pub use utils::{sanitize_filename, unique_stem};
pub use transcript_writer::{
    render_plain_text, render_rttm, render_structured, ArtifactFailure, ArtifactKind, OutputWriter,
    WrittenArtifact, WrittenArtifacts,
};
