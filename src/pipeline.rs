//! Per-file normalisation pipeline.
//!
//! read → decode → normalise → write output → archive original.
//!
//! The original is only moved after its output has been written. A file
//! whose output already exists when processing starts was left behind by
//! an interrupted run; it is regenerated and reported as reconciled. Two
//! files of the same run never share an output path: the second one fails.

use crate::encoding::{self, EncodingTag};
use crate::error::{IoStage, PipelineError};
use crate::metadata::WorkInfo;
use crate::text::{IterationMarkAnomaly, Normalizer};
use crate::workspace::Workspace;
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// How a successfully processed file got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Written and archived in one go.
    Completed,
    /// An output from an earlier, interrupted run was replaced.
    Reconciled,
}

/// Result of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Input file name.
    pub file: String,
    /// Path of the written output.
    pub output: PathBuf,
    /// Encoding the input was decoded as.
    pub encoding: EncodingTag,
    pub status: FileStatus,
    /// Iteration marks that could not be expanded.
    pub anomalies: Vec<IterationMarkAnomaly>,
    /// Title and author from the header, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkInfo>,
}

/// Normalises files from a workspace.
#[derive(Debug)]
pub struct Pipeline {
    workspace: Workspace,
    normalizer: Normalizer,
    name_by_title: bool,
    /// Output paths written during this run.
    claimed: Mutex<HashSet<PathBuf>>,
}

impl Pipeline {
    /// Creates a pipeline that keeps input file names for outputs.
    pub fn new(workspace: Workspace, normalizer: Normalizer) -> Self {
        Self {
            workspace,
            normalizer,
            name_by_title: false,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Names outputs after the work's title and author when a header exists.
    pub fn with_name_by_title(mut self, enabled: bool) -> Self {
        self.name_by_title = enabled;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Runs every stage for one file of the input directory.
    ///
    /// On failure the input stays where it is; nothing is archived.
    #[instrument(skip(self))]
    pub async fn process_file(&self, file_name: &str) -> Result<FileOutcome, PipelineError> {
        let input = self.workspace.input_path(file_name);

        let raw = tokio::fs::read(&input)
            .await
            .map_err(|source| io_error(file_name, IoStage::Read, source))?;

        let decoded = encoding::decode(&raw).map_err(|source| PipelineError::Encoding {
            file: file_name.to_string(),
            source,
        })?;
        drop(raw);
        info!(encoding = %decoded.encoding, "detected encoding");

        let normalized = self.normalizer.normalize(&decoded.text);
        let work = WorkInfo::from_header(&normalized.header);

        let output = self.workspace.output_path(&self.output_name(file_name, work.as_ref()));
        if !self.claim(&output) {
            return Err(io_error(
                file_name,
                IoStage::Write,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} was already written by another file", output.display()),
                ),
            ));
        }

        let status = if exists(&output).await {
            warn!(
                output = %output.display(),
                "output from an interrupted run found, regenerating"
            );
            FileStatus::Reconciled
        } else {
            FileStatus::Completed
        };

        tokio::fs::write(&output, normalized.output())
            .await
            .map_err(|source| io_error(file_name, IoStage::Write, source))?;
        debug!(output = %output.display(), "output written");

        tokio::fs::rename(&input, self.workspace.archive_path(file_name))
            .await
            .map_err(|source| PipelineError::InconsistentCompletion {
                file: file_name.to_string(),
                output: output.clone(),
                source,
            })?;
        info!("archived");

        Ok(FileOutcome {
            file: file_name.to_string(),
            output,
            encoding: decoded.encoding,
            status,
            anomalies: normalized.anomalies,
            work,
        })
    }

    /// Lists archived files that have no output.
    ///
    /// An archived file counts as done when an output exists under its own
    /// name or under the title-based name derived from its header, whatever
    /// naming mode this pipeline uses.
    pub async fn orphaned_archives(&self) -> io::Result<Vec<String>> {
        let mut orphans = Vec::new();
        for file_name in self.workspace.archived_files().await? {
            if !self.has_output(&file_name).await {
                orphans.push(file_name);
            }
        }
        Ok(orphans)
    }

    async fn has_output(&self, file_name: &str) -> bool {
        if exists(&self.workspace.output_path(file_name)).await {
            return true;
        }
        match self.archived_title_name(file_name).await {
            Some(name) => exists(&self.workspace.output_path(&name)).await,
            None => false,
        }
    }

    /// Title-based output name of an archived file, if its header has one.
    async fn archived_title_name(&self, file_name: &str) -> Option<String> {
        let raw = tokio::fs::read(self.workspace.archive_path(file_name)).await.ok()?;
        let decoded = encoding::decode(&raw).ok()?;
        let header = self.normalizer.normalize(&decoded.text).header;
        WorkInfo::from_header(&header).map(|work| work.file_name(file_name))
    }

    fn output_name(&self, file_name: &str, work: Option<&WorkInfo>) -> String {
        match work {
            Some(work) if self.name_by_title => work.file_name(file_name),
            _ => file_name.to_string(),
        }
    }

    /// Reserves `output` for the calling file. False if already taken.
    fn claim(&self, output: &Path) -> bool {
        match self.claimed.lock() {
            Ok(mut claimed) => claimed.insert(output.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().insert(output.to_path_buf()),
        }
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn io_error(file_name: &str, stage: IoStage, source: io::Error) -> PipelineError {
    PipelineError::Io {
        file: file_name.to_string(),
        stage,
        source,
    }
}
