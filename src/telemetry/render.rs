//! Render run and job span helpers.

use tracing::Span;
use uuid::Uuid;

/// Start a span covering one dispatch run.
pub fn start_run_span(run_id: &Uuid, jobs: usize) -> Span {
    tracing::info_span!(
        "keycaps.run",
        "run.id" = %run_id,
        "run.jobs" = jobs,
        "run.failed" = tracing::field::Empty,
    )
}

/// Start a span for one renderer process.
///
/// `job.exit_code` is declared empty and filled by [`record_job_exit`].
pub fn start_job_span(key: &str, part: &str) -> Span {
    tracing::info_span!(
        "keycaps.job",
        "job.key" = key,
        "job.part" = part,
        "job.exit_code" = tracing::field::Empty,
    )
}

/// Record a renderer exit on the job span. `None` means killed by a signal.
pub fn record_job_exit(span: &Span, code: Option<i32>) {
    if let Some(code) = code {
        span.record("job.exit_code", code);
    }
    span.in_scope(|| {
        tracing::debug!(exit_code = ?code, "renderer exited");
    });
}

/// Record the failure count on the run span.
pub fn record_run_failures(span: &Span, failed: usize) {
    span.record("run.failed", failed);
}
