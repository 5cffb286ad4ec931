//! Error types for the normalizer.
//!
//! Uses `thiserror` for structured error definitions. Per-file failures
//! carry the file name so the batch driver can report them without
//! extra bookkeeping.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a raw byte buffer into text.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// No supported encoding matched the buffer
    #[error("Could not determine encoding: {0}")]
    Undetermined(String),

    /// Something was detected, but it is not a text encoding we decode
    #[error("Unsupported encoding: {0}")]
    Unsupported(&'static str),

    /// The detected encoding rejected the bytes during strict decoding
    #[error("Malformed {0} input")]
    Malformed(&'static str),
}

/// Filesystem step that failed for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IoStage {
    Read,
    Write,
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IoStage::Read => "read",
            IoStage::Write => "write",
        })
    }
}

/// Classification of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EncodingUndetermined,
    IoFailure,
    InconsistentCompletion,
}

/// A failure that aborted the pipeline for one file.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input could not be decoded
    #[error("{file}: {source}")]
    Encoding {
        file: String,
        #[source]
        source: EncodingError,
    },

    /// Reading the input or writing the output failed
    #[error("{file}: {stage} failed: {source}")]
    Io {
        file: String,
        stage: IoStage,
        #[source]
        source: std::io::Error,
    },

    /// The output exists but the input could not be archived
    #[error("{file}: output written to {} but archiving failed: {source}", .output.display())]
    InconsistentCompletion {
        file: String,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Returns the taxonomy kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Encoding { .. } => ErrorKind::EncodingUndetermined,
            PipelineError::Io { .. } => ErrorKind::IoFailure,
            PipelineError::InconsistentCompletion { .. } => ErrorKind::InconsistentCompletion,
        }
    }

    /// Returns the name of the file that failed.
    pub fn file(&self) -> &str {
        match self {
            PipelineError::Encoding { file, .. }
            | PipelineError::Io { file, .. }
            | PipelineError::InconsistentCompletion { file, .. } => file,
        }
    }
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}
