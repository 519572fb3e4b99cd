// Resolved media inputs
use std::path::{Path, PathBuf};
use serde::Serialize;

/// Extensions (lowercase, without dot) the pipeline accepts
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "m4a", "aac", "flac", "ogg", "mkv", "mov", "mp4", "avi", "mpeg", "vob",
];

/// Extension of a manifest file listing further inputs
pub const MANIFEST_EXTENSION: &str = "list";

/// How a media file entered the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOrigin {
    LocalFile,
    DownloadedFromUrl,
    ListedInManifest,
}

/// One concrete local media file to process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFile {
    /// Absolute local path
    pub path: PathBuf,
    pub display_name: String,
    pub origin: MediaOrigin,
    /// The input entry this file came from (path or URL)
    pub source: String,
}

impl MediaFile {
    pub fn new(path: PathBuf, origin: MediaOrigin, source: impl Into<String>) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            path,
            display_name,
            origin,
            source: source.into(),
        }
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.display_name.clone())
    }
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_manifest(path: &Path) -> bool {
    extension_lowercase(path).as_deref() == Some(MANIFEST_EXTENSION)
}

pub fn is_url(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_checks_ignore_case() {
        assert!(is_supported(Path::new("/a/b/Interview.MP3")));
        assert!(is_supported(Path::new("clip.mkv")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("README")));
        assert!(is_manifest(Path::new("batch.LIST")));
        assert!(!is_manifest(Path::new("batch.txt")));
    }

    #[test]
    fn test_url_detection() {
        assert!(is_url("https://example.com/a.mp3"));
        assert!(is_url("HTTP://example.com/a.mp3"));
        assert!(!is_url("ftp://example.com/a.mp3"));
        assert!(!is_url("/tmp/https.mp3"));
    }

    #[test]
    fn test_media_file_names() {
        let media = MediaFile::new(PathBuf::from("/data/show.s01e01.mp4"), MediaOrigin::LocalFile, "show.s01e01.mp4");
        assert_eq!(media.display_name, "show.s01e01.mp4");
        assert_eq!(media.stem(), "show.s01e01");
    }
}
