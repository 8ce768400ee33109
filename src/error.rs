//! Error types for Passport Gate
//!
//! Detector failures are not errors here: they arrive as
//! `Observation::Errored` and invalidate the affected checks.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to hand an action to a validation session
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("validation session closed")]
    SessionClosed,
}

/// Configuration could not be loaded or is inconsistent
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A replay script line could not be used
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: at_ms {at_ms} is earlier than the previous step")]
    OutOfOrder { line: usize, at_ms: u64 },
}
