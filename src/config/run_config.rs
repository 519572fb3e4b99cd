// RunConfig - the immutable options of one run
use std::path::PathBuf;
use log::debug;

use super::cli::Args;
use super::file::ConfigFile;
use crate::errors::ConfigError;
use crate::models::Device;
use crate::subtitles::DEFAULT_WORDS_PER_BLOCK;

pub const DEFAULT_OUTPUT_DIR: &str = "./transcriptions";
pub const DEFAULT_MODEL: &str = "large-v2";

/// `<data dir>/mediascribe/models`, falling back to the home directory
pub fn default_models_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join("mediascribe").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub device: Device,
    pub model: String,
    /// None means auto-detect
    pub language: Option<String>,
    pub annotate: bool,
    pub translate: bool,
    pub subtitle: bool,
    /// Words per subtitle block, always >= 1
    pub sub_length: usize,
    pub hf_token: Option<String>,
    pub verbose: bool,
    pub models_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// None means search PATH and the sidecar location
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let output_dir = PathBuf::from(DEFAULT_OUTPUT_DIR);
        Self {
            cache_dir: output_dir.join(".downloads"),
            output_dir,
            device: Device::Cpu,
            model: DEFAULT_MODEL.to_string(),
            language: None,
            annotate: false,
            translate: false,
            subtitle: false,
            sub_length: DEFAULT_WORDS_PER_BLOCK,
            hf_token: None,
            verbose: false,
            models_dir: default_models_dir(),
            ffmpeg_path: None,
        }
    }
}

/// What to process and how
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Input specification; None when neither the CLI nor the file gave one
    pub input: Option<String>,
    pub config: RunConfig,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RunConfig {
    /// Merge the CLI over the config file over the defaults, then validate.
    pub fn merge(cli: &Args, file: &ConfigFile) -> Result<Invocation, ConfigError> {
        let defaults = RunConfig::default();

        let device = match (cli.device, file.device.as_deref()) {
            (Some(device), _) => device,
            (None, Some(name)) => name.parse()?,
            (None, None) => defaults.device,
        };

        let sub_length = cli.sub_length.or(file.sub_length).unwrap_or(defaults.sub_length);
        if sub_length == 0 {
            return Err(ConfigError::InvalidSubLength);
        }

        let language = non_empty(cli.lang.clone().or_else(|| file.lang.clone()))
            .map(|lang| lang.to_lowercase())
            .filter(|lang| lang != "auto");

        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| file.output_dir.clone())
            .unwrap_or(defaults.output_dir);

        let cache_dir = cli
            .cache_dir
            .clone()
            .or_else(|| file.cache_dir.clone())
            .unwrap_or_else(|| output_dir.join(".downloads"));

        let config = RunConfig {
            device,
            model: non_empty(cli.model.clone().or_else(|| file.model.clone())).unwrap_or(defaults.model),
            language,
            annotate: cli.annotate || file.annotate.unwrap_or(defaults.annotate),
            translate: cli.translate || file.translate.unwrap_or(defaults.translate),
            subtitle: cli.subtitle || file.subtitle.unwrap_or(defaults.subtitle),
            sub_length,
            hf_token: non_empty(cli.hf_token.clone().or_else(|| file.hf_token.clone())),
            verbose: cli.verbose || file.verbose.unwrap_or(defaults.verbose),
            models_dir: cli
                .models_dir
                .clone()
                .or_else(|| file.models_dir.clone())
                .unwrap_or(defaults.models_dir),
            cache_dir,
            output_dir,
            ffmpeg_path: cli.ffmpeg.clone().or_else(|| file.ffmpeg.clone()),
        };

        let input = non_empty(cli.files.clone().or_else(|| file.files.clone()));
        debug!("Merged run configuration: input={:?}, model={}, device={}", input, config.model, config.device);

        Ok(Invocation { input, config })
    }
}
