// JSON config file
use std::path::{Path, PathBuf};
use log::debug;
use serde::Deserialize;

use crate::errors::ConfigError;

/// Options read from `--config`. Every key is optional; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub files: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub device: Option<String>,
    pub model: Option<String>,
    pub lang: Option<String>,
    pub annotate: Option<bool>,
    pub hf_token: Option<String>,
    pub translate: Option<bool>,
    pub subtitle: Option<bool>,
    pub sub_length: Option<usize>,
    pub verbose: Option<bool>,
    pub models_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ConfigFile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config file {}: {:?}", path.display(), config.redacted());
        Ok(config)
    }

    /// Copy safe to log
    fn redacted(&self) -> Self {
        Self {
            hf_token: self.hf_token.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}
