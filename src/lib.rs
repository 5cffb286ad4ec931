//! Aozora Normalizer - turns Aozora Bunko notation into plain reading text.
//!
//! This library provides functionality for:
//! - Detecting and decoding the encodings Japanese plain-text works ship in
//! - Expanding iteration marks and stripping ruby, editorial and footer markup
//! - Running the normalisation over a directory of files, archiving originals

pub mod batch;
pub mod config;
pub mod console;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod text;
pub mod workspace;

// Re-export commonly used types
pub use batch::{BatchReport, FailedFile, run_batch};
pub use config::Config;
pub use console::Console;
pub use encoding::{Decoded, EncodingTag};
pub use error::{ConfigError, EncodingError, ErrorKind, PipelineError};
pub use metadata::WorkInfo;
pub use pipeline::{FileOutcome, FileStatus, Pipeline};
pub use text::{Normalized, Normalizer};
pub use workspace::Workspace;
