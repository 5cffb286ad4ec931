//! Batch driver: one independent pipeline task per input file.
//!
//! Failures are caught at the task boundary and collected; they never stop
//! sibling files. Re-running the batch is the retry mechanism, since
//! archived files drop out of the next scan.

use crate::error::{ErrorKind, PipelineError};
use crate::pipeline::{FileOutcome, Pipeline};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::io;
use tracing::{error, info, warn};

/// A file whose pipeline failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<PipelineError> for FailedFile {
    fn from(err: PipelineError) -> Self {
        Self {
            file: err.file().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Files written and archived, sorted by name.
    pub processed: Vec<FileOutcome>,
    /// Files left in the input directory, sorted by name.
    pub failed: Vec<FailedFile>,
    /// Archived files that have no output.
    pub orphaned_archives: Vec<String>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.processed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Names of the files that failed.
    pub fn failed_files(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.file.as_str()).collect()
    }

    /// True when every file succeeded and no archive is orphaned.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.orphaned_archives.is_empty()
    }
}

/// Processes every file in the pipeline's input directory.
///
/// At most `max_concurrent` files are in flight at once. Only a failure to
/// list the input or archive directory is returned as an error.
pub async fn run_batch(pipeline: &Pipeline, max_concurrent: usize) -> io::Result<BatchReport> {
    let files = pipeline.workspace().scan_inputs().await?;
    info!(files = files.len(), "starting batch");

    let results: Vec<Result<FileOutcome, PipelineError>> = stream::iter(files)
        .map(|file| async move { pipeline.process_file(&file).await })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(outcome) => report.processed.push(outcome),
            Err(err) => {
                error!(file = err.file(), kind = ?err.kind(), "{}", err);
                report.failed.push(err.into());
            }
        }
    }
    report.processed.sort_by(|a, b| a.file.cmp(&b.file));
    report.failed.sort_by(|a, b| a.file.cmp(&b.file));

    report.orphaned_archives = pipeline.orphaned_archives().await?;
    for orphan in &report.orphaned_archives {
        warn!(file = %orphan, "archived without output; move it back to the input directory to retry");
    }

    info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Normalizer;
    use crate::workspace::Workspace;
    use std::path::Path;
    use tempfile::TempDir;

    async fn setup(root: &Path) -> Pipeline {
        let input = root.join("txt");
        let workspace = Workspace::new(&input, root.join("modify"), input.join("complete"));
        workspace.provision().await.unwrap();
        Pipeline::new(workspace, Normalizer::default())
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = setup(temp_dir.path()).await;
        let ws = pipeline.workspace();

        for i in 0..5 {
            std::fs::write(ws.input_path(&format!("good{i}.txt")), format!("本文{i}")).unwrap();
        }
        let binary = [0x00u8, 0x01, 0x02, 0x03];
        std::fs::write(ws.input_path("bad1.bin"), binary).unwrap();
        std::fs::write(ws.input_path("bad2.bin"), binary).unwrap();

        let report = run_batch(&pipeline, 3).await.unwrap();
        assert_eq!(report.success_count(), 5);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.failed_files(), vec!["bad1.bin", "bad2.bin"]);
        assert!(report.failed.iter().all(|f| f.kind == ErrorKind::EncodingUndetermined));
        assert!(!report.is_success());

        for i in 0..5 {
            let name = format!("good{i}.txt");
            assert!(ws.archive_path(&name).exists());
            assert_eq!(
                std::fs::read_to_string(ws.output_path(&name)).unwrap(),
                format!("本文{i}")
            );
        }
        assert_eq!(std::fs::read(ws.input_path("bad1.bin")).unwrap(), binary);
        assert!(ws.input_path("bad2.bin").exists());
        assert!(!ws.output_path("bad1.bin").exists());

        // Only the failures are picked up again.
        let rerun = run_batch(&pipeline, 3).await.unwrap();
        assert_eq!(rerun.success_count(), 0);
        assert_eq!(rerun.failure_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = setup(temp_dir.path()).await;

        let report = run_batch(&pipeline, 4).await.unwrap();
        assert_eq!(report.success_count(), 0);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_report_lists_orphaned_archives() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = setup(temp_dir.path()).await;
        let ws = pipeline.workspace();

        std::fs::write(ws.archive_path("lost.txt"), "本文").unwrap();

        let report = run_batch(&pipeline, 1).await.unwrap();
        assert_eq!(report.orphaned_archives, vec!["lost.txt".to_string()]);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = setup(temp_dir.path()).await;
        std::fs::write(pipeline.workspace().input_path("a.txt"), "本文").unwrap();

        let report = run_batch(&pipeline, 1).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["processed"][0]["file"], "a.txt");
        assert_eq!(json["processed"][0]["encoding"], "UTF-8");
        assert_eq!(json["processed"][0]["status"], "completed");
    }
}
