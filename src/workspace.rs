//! Directory layout of a normalisation run.
//!
//! Inputs are read from one directory, normalised texts are written to a
//! second one, and originals are moved to an archive directory once their
//! output exists. Archived files are never scanned again.

use crate::config::Config;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Input, output and archive directories.
#[derive(Debug, Clone)]
pub struct Workspace {
    input: PathBuf,
    output: PathBuf,
    archive: PathBuf,
}

impl Workspace {
    /// Creates a workspace from explicit directories.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        archive: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            archive: archive.into(),
        }
    }

    /// Creates a workspace from the `[paths]` config section.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.paths.input_directory,
            &config.paths.output_directory,
            config.archive_dir(),
        )
    }

    pub fn input_dir(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive
    }

    pub fn input_path(&self, file_name: &str) -> PathBuf {
        self.input.join(file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output.join(file_name)
    }

    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.archive.join(file_name)
    }

    /// Creates all three directories if they are missing.
    pub async fn provision(&self) -> io::Result<()> {
        for dir in [&self.input, &self.output, &self.archive] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Lists the regular files waiting in the input directory, sorted by name.
    ///
    /// Subdirectories, including a nested archive directory, are skipped.
    pub async fn scan_inputs(&self) -> io::Result<Vec<String>> {
        let mut names = list_files(&self.input).await?;
        names.sort();
        Ok(names)
    }

    /// Lists the files in the archive directory, sorted by name.
    ///
    /// A missing archive directory holds no files.
    pub async fn archived_files(&self) -> io::Result<Vec<String>> {
        let mut names = match list_files(&self.archive).await {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        names.sort();
        Ok(names)
    }
}

async fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(file = ?name, "skipping file with non-UTF-8 name"),
        }
    }

    Ok(names)
}
