//! Dispatcher: launch every render job, then wait for all of them.
//!
//! Jobs are independent processes writing distinct files. One job failing
//! never affects another; every launch error and non-zero exit ends up in the
//! [`DispatchReport`] instead of aborting the batch. Only setting up the
//! output directory can fail the run as a whole.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::telemetry::metrics;
use crate::telemetry::render::{
    record_job_exit, record_run_failures, start_job_span, start_run_span,
};
use chrono::Utc;
use opentelemetry::KeyValue;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use super::job::{RenderJob, RenderSettings};
use super::report::{DispatchReport, JobOutcome, JobStatus};

/// Knobs that change how jobs run, not what they produce.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Ceiling on concurrently running renderers. `None` launches every job
    /// at once.
    pub max_concurrent: Option<NonZeroUsize>,
    /// Remove `.stl` files the current catalog would not produce.
    pub prune_stale: bool,
    /// Discard renderer stdout/stderr.
    pub quiet_renderer: bool,
}

pub struct Dispatcher {
    settings: RenderSettings,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(settings: RenderSettings, options: DispatchOptions) -> Self {
        Self { settings, options }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Create the output directory if absent. An existing directory is fine.
    pub async fn ensure_out_dir(&self) -> Result<()> {
        let path = &self.settings.out_dir;
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| Error::OutputDir {
                path: path.clone(),
                source,
            })
    }

    /// Delete `.stl` files in the output directory that are not in `expected`.
    pub async fn prune_stale(&self, expected: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.settings.out_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "stl") {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if expected.contains(&name) || !entry.file_type().await?.is_file() {
                continue;
            }
            tokio::fs::remove_file(&path).await?;
            debug!(path = %path.display(), "removed stale output");
            removed.push(path);
        }

        removed.sort();
        Ok(removed)
    }

    /// Render every key of the catalog.
    ///
    /// Returns once every job has terminated. The report lists outcomes in
    /// plan order, regardless of completion order.
    pub async fn run(&self, catalog: &Catalog) -> Result<DispatchReport> {
        let jobs = self.settings.plan(catalog);
        let run_id = Uuid::new_v4();
        let span = start_run_span(&run_id, jobs.len());

        async {
            self.ensure_out_dir().await?;

            let pruned = if self.options.prune_stale {
                let expected = self.settings.expected_outputs(catalog);
                let pruned = self.prune_stale(&expected).await?;
                if !pruned.is_empty() {
                    info!(count = pruned.len(), "pruned stale outputs");
                }
                pruned
            } else {
                Vec::new()
            };

            let started_at = Utc::now();
            let outcomes = self.fan_out(jobs).await;
            let finished_at = Utc::now();

            let report = DispatchReport {
                run_id,
                out_dir: self.settings.out_dir.clone(),
                mode: self.settings.mode,
                started_at,
                finished_at,
                pruned,
                outcomes,
            };

            let failed = report.total() - report.succeeded();
            record_run_failures(&span, failed);
            info!(
                total = report.total(),
                failed,
                duration_ms = report.duration_ms(),
                "dispatch finished"
            );
            Ok::<_, Error>(report)
        }
        .instrument(span.clone())
        .await
    }

    async fn fan_out(&self, jobs: Vec<RenderJob>) -> Vec<JobOutcome> {
        let limiter = self
            .options
            .max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.get())));
        let quiet = self.options.quiet_renderer;
        let pending: Vec<JobOutcome> = jobs.iter().map(unfinished_outcome).collect();
        let mut set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let limiter = limiter.clone();
            set.spawn(
                async move {
                    let _permit = match limiter {
                        Some(sem) => sem.acquire_owned().await.ok(),
                        None => None,
                    };
                    (index, run_job(job, quiet).await)
                }
                .in_current_span(),
            );
        }
        debug!(jobs = pending.len(), "all jobs dispatched, waiting");

        join_outcomes(set, pending).await
    }
}

/// Placeholder for a job whose task never handed back an outcome.
fn unfinished_outcome(job: &RenderJob) -> JobOutcome {
    JobOutcome {
        key: job.key.clone(),
        part: job.part,
        output: job.output.clone(),
        command: job.command_line(),
        status: JobStatus::Aborted {
            error: "render task ended without reporting".to_string(),
        },
        duration_ms: 0,
    }
}

/// Drain every task, slotting outcomes back into plan order. A task that
/// panics or is cancelled leaves its placeholder in place.
async fn join_outcomes(
    mut set: JoinSet<(usize, JobOutcome)>,
    mut outcomes: Vec<JobOutcome>,
) -> Vec<JobOutcome> {
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = outcome,
            Err(e) => {
                error!(error = %e, "render task failed");
                metrics::jobs_failed().add(1, &[KeyValue::new("reason", "aborted")]);
            }
        }
    }
    outcomes
}

async fn run_job(job: RenderJob, quiet: bool) -> JobOutcome {
    let part = job.part.to_string();
    let labels = [KeyValue::new("part", part.clone())];
    let span = start_job_span(&job.key, &part);
    let command = job.command_line();
    let start = Instant::now();

    let status = async {
        info!(command = %command, "launching renderer");
        let mut child = match job.command(quiet).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, "renderer failed to launch");
                return JobStatus::LaunchFailed {
                    error: e.to_string(),
                };
            }
        };
        metrics::jobs_launched().add(1, &labels);

        match child.wait().await {
            Ok(status) => {
                record_job_exit(&tracing::Span::current(), status.code());
                if status.success() {
                    JobStatus::Succeeded
                } else {
                    warn!(exit_code = ?status.code(), "renderer exited with failure");
                    JobStatus::Failed {
                        code: status.code(),
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "lost track of renderer process");
                JobStatus::LaunchFailed {
                    error: e.to_string(),
                }
            }
        }
    }
    .instrument(span)
    .await;

    let duration_ms = start.elapsed().as_millis() as u64;
    metrics::job_duration_ms().record(duration_ms as f64, &labels);
    match &status {
        JobStatus::Succeeded => {}
        JobStatus::Failed { .. } => metrics::jobs_failed().add(
            1,
            &[labels[0].clone(), KeyValue::new("reason", "exit")],
        ),
        JobStatus::LaunchFailed { .. } => metrics::jobs_failed().add(
            1,
            &[labels[0].clone(), KeyValue::new("reason", "launch")],
        ),
        JobStatus::Aborted { .. } => {}
    }

    JobOutcome {
        key: job.key,
        part: job.part,
        output: job.output,
        command,
        status,
        duration_ms,
    }
}
