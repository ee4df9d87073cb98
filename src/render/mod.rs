//! Render dispatch: job construction, process fan-out/fan-in, outcome report.

pub mod dispatch;
pub mod job;
pub mod report;

pub use dispatch::{DispatchOptions, Dispatcher};
pub use job::{RenderJob, RenderSettings};
pub use report::{DispatchReport, JobOutcome, JobStatus};
