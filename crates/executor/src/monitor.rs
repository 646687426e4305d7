//! Deadline-bound wait for bundle inclusion

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use arb_core::TransportError;

/// Inclusion monitor states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionState {
    Waiting,
    Included,
    /// Not observed before the deadline; an expected outcome
    TimedOut,
    /// The relay call failed, the outcome is unknown
    TransportError,
}

impl InclusionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InclusionState::Waiting)
    }
}

/// Waits on a submission future under a hard deadline
#[derive(Debug)]
pub struct InclusionMonitor {
    window: Duration,
    state: InclusionState,
}

impl InclusionMonitor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: InclusionState::Waiting,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> InclusionState {
        self.state
    }

    /// Deadline for a wait starting now
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.window
    }

    /// Drive `submission` until it resolves or `deadline` passes.
    ///
    /// The submission future is dropped at the deadline, which cancels any
    /// request it still has in flight. Returns `Included` or `TimedOut`;
    /// a failing submission is returned as the error.
    pub async fn watch<F>(
        &mut self,
        deadline: Instant,
        submission: F,
    ) -> Result<InclusionState, TransportError>
    where
        F: Future<Output = Result<bool, TransportError>>,
    {
        self.state = InclusionState::Waiting;
        debug!(window_secs = self.window.as_secs(), "waiting for inclusion");

        let result = match timeout_at(deadline, submission).await {
            Ok(Ok(true)) => {
                info!("bundle included");
                Ok(InclusionState::Included)
            }
            Ok(Ok(false)) => {
                info!("relay rounds exhausted without inclusion");
                Ok(InclusionState::TimedOut)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "relay failed while waiting for inclusion");
                Err(e)
            }
            Err(_) => {
                info!("inclusion deadline reached");
                Ok(InclusionState::TimedOut)
            }
        };

        self.state = match &result {
            Ok(state) => *state,
            Err(_) => InclusionState::TransportError,
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;
    use tokio_test::{assert_pending, assert_ready};

    #[tokio::test(start_paused = true)]
    async fn test_included() {
        let mut monitor = InclusionMonitor::new(Duration::from_secs(60));
        let deadline = monitor.deadline();

        let state = monitor
            .watch(deadline, async {
                tokio::time::sleep(Duration::from_secs(13)).await;
                Ok(true)
            })
            .await
            .unwrap();

        assert_eq!(state, InclusionState::Included);
        assert_eq!(monitor.state(), InclusionState::Included);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_not_before_deadline() {
        let mut monitor = InclusionMonitor::new(Duration::from_secs(60));
        let start = Instant::now();
        let deadline = monitor.deadline();

        let state = monitor
            .watch(deadline, future::pending::<Result<bool, TransportError>>())
            .await
            .unwrap();

        assert_eq!(state, InclusionState::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_until_deadline() {
        let mut monitor = InclusionMonitor::new(Duration::from_secs(60));
        let deadline = monitor.deadline();

        {
            let mut wait = tokio_test::task::spawn(
                monitor.watch(deadline, future::pending::<Result<bool, TransportError>>()),
            );
            assert_pending!(wait.poll());

            tokio::time::advance(Duration::from_secs(59)).await;
            assert_pending!(wait.poll());

            tokio::time::advance(Duration::from_secs(1)).await;
            let state = assert_ready!(wait.poll());
            assert_eq!(state.unwrap(), InclusionState::TimedOut);
        }

        assert_eq!(monitor.state(), InclusionState::TimedOut);
    }

    #[tokio::test]
    async fn test_transport_error_is_distinct() {
        let mut monitor = InclusionMonitor::new(Duration::from_secs(60));
        let deadline = monitor.deadline();

        let result = monitor
            .watch(deadline, async {
                Err(TransportError::Http("connection refused".to_string()))
            })
            .await;

        assert!(matches!(result, Err(TransportError::Http(_))));
        assert_eq!(monitor.state(), InclusionState::TransportError);
        assert!(monitor.state().is_terminal());
    }

    #[tokio::test]
    async fn test_rounds_exhausted_is_not_included() {
        let mut monitor = InclusionMonitor::new(Duration::from_secs(60));
        let deadline = monitor.deadline();

        let state = monitor.watch(deadline, async { Ok(false) }).await.unwrap();
        assert_eq!(state, InclusionState::TimedOut);
    }
}
