//! Failures of `gradient-field` subcommands and their exit codes.
//!
//! - 2:  clap rejected the arguments
//! - 10: `render` viewport has no usable physical size
//! - 11: settings file unreadable or PNG not writable
//! - 12: settings document or `--set` override rejected
//! - 13: `--json` output could not be produced

use gradient_field_core::EngineError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// The simulator or raster refused the requested viewport.
    Engine(EngineError),
    /// Reading `--settings` or writing the `render` output failed.
    Io(String),
    /// A setting key, value, or document the engine does not accept.
    Input(String),
    /// Building the `--json` report failed.
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Maps a `Setting::from_json` or `Settings::get` rejection.
    pub fn setting(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            other => CliError::Input(other.to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
