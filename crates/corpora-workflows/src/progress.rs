//! Progress reporting hooks.

use std::time::Duration;

use corpora_core::{Error, Phase, SystemStatus};

/// Receives progress events from a running [`LoadWorkflow`](crate::LoadWorkflow).
///
/// All methods default to doing nothing, so implementors only override the
/// events they render.
pub trait ProgressObserver: Send + Sync {
    /// A phase is about to issue its first request.
    fn phase_started(&self, _dataset: &str, _phase: Phase) {}

    /// A phase completed successfully.
    fn phase_finished(&self, _dataset: &str, _phase: Phase, _elapsed: Duration) {}

    /// A phase failed; the run stops unless the phase is best-effort.
    fn phase_failed(&self, _dataset: &str, _phase: Phase, _error: &Error) {}

    /// A status snapshot was fetched while waiting.
    fn status_polled(&self, _dataset: &str, _phase: Phase, _status: &SystemStatus) {}

    /// A best-effort step failed and the run continues.
    fn warning(&self, _dataset: &str, _phase: Phase, _message: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
