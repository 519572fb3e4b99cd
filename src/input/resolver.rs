// Input resolution: file, directory, URL or manifest -> ordered media files
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};

use super::download::MediaFetcher;
use super::media::{is_manifest, is_supported, is_url, MediaFile, MediaOrigin};
use crate::errors::InputError;

/// Ordered, deduplicated media files plus everything skipped along the way
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub files: Vec<MediaFile>,
    pub warnings: Vec<String>,
}

#[derive(Default)]
struct Collector {
    files: Vec<MediaFile>,
    seen: HashSet<PathBuf>,
    warnings: Vec<String>,
}

impl Collector {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    fn push(&mut self, path: &Path, origin: MediaOrigin, source: &str) {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.seen.insert(canonical.clone()) {
            self.files.push(MediaFile::new(canonical, origin, source));
        } else {
            debug!("Skipping duplicate input {}", canonical.display());
        }
    }

    fn push_file(&mut self, path: &Path, origin: MediaOrigin, source: &str) {
        if is_supported(path) {
            self.push(path, origin, source);
        } else {
            self.warn(format!("Skipping unsupported file {}", path.display()));
        }
    }

    /// Every supported file below `dir`, in lexicographic path order
    fn push_directory(&mut self, dir: &Path, origin: MediaOrigin) {
        let mut found = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let entries = match std::fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(e) => {
                    self.warn(format!("Cannot read directory {}: {}", current.display(), e));
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    found.push(path);
                }
            }
        }

        found.sort();
        debug!("Found {} files under {}", found.len(), dir.display());

        for path in found {
            let source = path.to_string_lossy().to_string();
            self.push_file(&path, origin, &source);
        }
    }
}

/// Turns the user's input specification into media files
pub struct InputResolver {
    cache_dir: PathBuf,
    fetcher: Arc<dyn MediaFetcher>,
}

impl InputResolver {
    pub fn new(cache_dir: impl Into<PathBuf>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fetcher,
        }
    }

    /// Resolve `spec` (file, directory, URL or `.list` manifest).
    ///
    /// Fails with `InvalidInput` for a missing path, an unreadable manifest or a
    /// manifest listing another manifest, and with `NoInput` when nothing is left.
    pub async fn resolve(&self, spec: &str) -> Result<Resolution, InputError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(InputError::InvalidInput("empty input specification".to_string()));
        }

        let mut collector = Collector::default();

        if is_url(spec) {
            self.push_url(&mut collector, spec).await;
        } else {
            let path = PathBuf::from(spec);
            if !path.exists() {
                return Err(InputError::InvalidInput(format!("{} does not exist", path.display())));
            }

            if path.is_dir() {
                collector.push_directory(&path, MediaOrigin::LocalFile);
            } else if is_manifest(&path) {
                self.resolve_manifest(&mut collector, &path).await?;
            } else {
                collector.push_file(&path, MediaOrigin::LocalFile, spec);
            }
        }

        if collector.files.is_empty() {
            return Err(InputError::NoInput(spec.to_string()));
        }

        info!(
            "Resolved {} media files from {} ({} skipped)",
            collector.files.len(),
            spec,
            collector.warnings.len()
        );

        Ok(Resolution {
            files: collector.files,
            warnings: collector.warnings,
        })
    }

    async fn push_url(&self, collector: &mut Collector, url: &str) {
        match self.fetcher.fetch(url, &self.cache_dir).await {
            Ok(path) => collector.push_file(&path, MediaOrigin::DownloadedFromUrl, url),
            Err(e) => collector.warn(format!("Failed to download {}: {:#}", url, e)),
        }
    }

    async fn resolve_manifest(&self, collector: &mut Collector, manifest: &Path) -> Result<(), InputError> {
        let content = std::fs::read_to_string(manifest).map_err(|e| {
            InputError::InvalidInput(format!("cannot read manifest {}: {}", manifest.display(), e))
        })?;

        let entries: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        // Reject nested manifests before fetching or resolving anything
        if let Some(nested) = entries.iter().find(|e| !is_url(e) && is_manifest(Path::new(e))) {
            return Err(InputError::InvalidInput(format!(
                "manifest {} lists another manifest ({}); manifests cannot be nested",
                manifest.display(),
                nested
            )));
        }

        let base = manifest.parent().unwrap_or_else(|| Path::new("."));
        info!("Reading {} entries from manifest {}", entries.len(), manifest.display());

        for entry in entries {
            if is_url(entry) {
                self.push_url(collector, entry).await;
                continue;
            }

            let path = base.join(entry);
            if !path.exists() {
                collector.warn(format!("Manifest entry {} does not exist", path.display()));
            } else if path.is_dir() {
                collector.push_directory(&path, MediaOrigin::ListedInManifest);
            } else {
                collector.push_file(&path, MediaOrigin::ListedInManifest, entry);
            }
        }

        Ok(())
    }
}
