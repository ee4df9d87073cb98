//! Per-job outcomes of a dispatch run.

use crate::error::{Error, Result};
use crate::model::{OutputMode, RenderPart};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How a single renderer process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    /// Exited non-zero. `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// The process could not be started or waited on.
    LaunchFailed { error: String },
    /// The task supervising the process ended before reporting.
    Aborted { error: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Succeeded => write!(f, "ok"),
            JobStatus::Failed { code: Some(code) } => write!(f, "exit {code}"),
            JobStatus::Failed { code: None } => write!(f, "killed"),
            JobStatus::LaunchFailed { error } => write!(f, "launch failed: {error}"),
            JobStatus::Aborted { error } => write!(f, "aborted: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub key: String,
    pub part: RenderPart,
    pub output: PathBuf,
    pub command: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub duration_ms: u64,
}

/// Everything a run did, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub run_id: Uuid,
    pub out_dir: PathBuf,
    pub mode: OutputMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stale files removed before launch.
    pub pruned: Vec<PathBuf>,
    pub outcomes: Vec<JobOutcome>,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{}/{} jobs succeeded in {}ms",
            self.succeeded(),
            self.total(),
            self.duration_ms()
        )
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Other(format!("serialize report: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
