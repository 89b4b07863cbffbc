//! Interval polling of the dataset lifecycle state.
//!
//! The load and index waits both fetch a [`SystemStatus`] on a fixed
//! interval until a classifier says the wait is over. Fetch errors are
//! returned immediately; an optional timeout bounds the wait.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::types::{SystemState, SystemStatus};

/// Interval between status fetches when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How often to poll and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    /// Delay between consecutive fetches
    pub interval: Duration,
    /// Maximum total wait; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl PollSpec {
    /// Polls at `interval` with no timeout.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    /// Bounds the wait.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PollSpec {
    fn default() -> Self {
        Self::every(DEFAULT_POLL_INTERVAL)
    }
}

/// Verdict on one status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Keep waiting.
    Pending,
    /// The wait is over.
    Done,
    /// The wait is over and the state is a failure.
    Failed,
}

/// How a wait ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The classifier reported [`PollStep::Done`].
    Reached(SystemStatus),
    /// The classifier reported [`PollStep::Failed`].
    ErrorState(SystemStatus),
    /// The timeout elapsed first.
    TimedOut {
        /// Last snapshot fetched; `None` if no fetch ever completed
        last: Option<SystemStatus>,
        /// How long the wait lasted
        waited: Duration,
    },
}

/// Load wait: anything but `Loading` ends it, `Error` as a failure.
pub fn load_settled(state: SystemState) -> PollStep {
    match state {
        SystemState::Loading => PollStep::Pending,
        SystemState::Error => PollStep::Failed,
        _ => PollStep::Done,
    }
}

/// Index wait: `Ready` ends it, `Error` and `Hibernated` end it as failures.
pub fn index_settled(state: SystemState) -> PollStep {
    if state.is_ready() {
        PollStep::Done
    } else if state.is_failure() {
        PollStep::Failed
    } else {
        PollStep::Pending
    }
}

/// Fetches status snapshots until `classify` stops returning `Pending`.
///
/// The first fetch happens immediately. `on_status` sees every snapshot,
/// including the final one. With a timeout, the deadline also bounds each
/// fetch and the sleeps between them.
pub async fn poll_status<F, Fut, C, O>(
    spec: PollSpec,
    mut fetch: F,
    classify: C,
    mut on_status: O,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SystemStatus>>,
    C: Fn(SystemState) -> PollStep,
    O: FnMut(&SystemStatus),
{
    let started = Instant::now();
    let deadline = spec.timeout.map(|timeout| started + timeout);
    let mut last: Option<SystemStatus> = None;
    let mut polls: u64 = 0;

    loop {
        let status = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, fetch()).await {
                Ok(fetched) => fetched?,
                Err(_) => {
                    let waited = started.elapsed();
                    tracing::warn!(polls, ?waited, "Wait timed out during a status fetch");
                    return Ok(PollOutcome::TimedOut { last, waited });
                }
            },
            None => fetch().await?,
        };
        polls += 1;
        on_status(&status);

        match classify(status.system_state) {
            PollStep::Done => {
                tracing::debug!(polls, state = %status.system_state, "Wait finished");
                return Ok(PollOutcome::Reached(status));
            }
            PollStep::Failed => {
                tracing::debug!(polls, state = %status.system_state, "Wait ended in failure state");
                return Ok(PollOutcome::ErrorState(status));
            }
            PollStep::Pending => {}
        }

        let now = Instant::now();
        let pause = match deadline {
            Some(deadline) if now >= deadline => {
                let waited = started.elapsed();
                tracing::warn!(polls, ?waited, state = %status.system_state, "Wait timed out");
                return Ok(PollOutcome::TimedOut {
                    last: Some(status),
                    waited,
                });
            }
            Some(deadline) => spec.interval.min(deadline - now),
            None => spec.interval,
        };
        last = Some(status);

        tokio::time::sleep(pause).await;
    }
}
