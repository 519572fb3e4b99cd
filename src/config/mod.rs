// Run configuration
//
// - cli.rs: clap command-line arguments
// - file.rs: JSON config file
// - run_config.rs: RunConfig and the single CLI > file > defaults merge

pub mod cli;
pub mod file;
pub mod run_config;

pub use cli::Args;
pub use file::ConfigFile;
pub use run_config::{default_models_dir, Invocation, RunConfig, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR};
