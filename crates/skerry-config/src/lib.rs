//! Configuration for the island generator.
//!
//! Settings persist to disk as a RON file. Every section falls back to its
//! defaults when missing, and command-line flags override loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, OutputConfig, default_config_dir};
pub use error::ConfigError;
