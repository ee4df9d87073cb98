//! Metric instrument factories.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("keycaps")
}

/// Counter: renderer processes started.
/// Labels: `part` ("combined" | "keycap" | "label").
pub fn jobs_launched() -> Counter<u64> {
    meter()
        .u64_counter("keycaps.jobs.launched")
        .with_description("Number of renderer processes started")
        .build()
}

/// Counter: jobs that failed to launch or exited non-zero.
/// Labels: `part`, `reason` ("launch" | "exit").
pub fn jobs_failed() -> Counter<u64> {
    meter()
        .u64_counter("keycaps.jobs.failed")
        .with_description("Number of render jobs that did not succeed")
        .build()
}

/// Histogram: wall time of a renderer process in milliseconds.
/// Labels: `part`.
pub fn job_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("keycaps.job.duration_ms")
        .with_description("Renderer process duration in milliseconds")
        .with_unit("ms")
        .build()
}
