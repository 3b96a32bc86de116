//! Bounded polling for asynchronous provider operations

use crate::traits::{OperationStatus, PendingOperation};
use std::time::Duration;
use tracing::{debug, warn};

/// Interval between completion checks for a record creation
pub const CREATE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum completion checks for a record creation
pub const CREATE_POLL_ATTEMPTS: usize = 6;

/// Final state of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The provider reported success
    Completed,
    /// The attempt budget ran out before the provider reported a final state
    TimedOut,
    /// The provider reported a terminal failure
    Failed(String),
}

/// Poll `operation` until it finishes or `max_attempts` checks have been made
///
/// Each check is preceded by a sleep of `interval`, so the wall-clock ceiling
/// is `interval * max_attempts`. A check that errors is logged and counts as
/// an attempt. The operation itself is never cancelled.
pub async fn poll_until_complete(
    operation: &mut dyn PendingOperation,
    interval: Duration,
    max_attempts: usize,
) -> PollOutcome {
    for attempt in 1..=max_attempts {
        tokio::time::sleep(interval).await;

        match operation.status().await {
            Ok(OperationStatus::Succeeded) => {
                debug!("Operation completed after {} check(s)", attempt);
                return PollOutcome::Completed;
            }
            Ok(OperationStatus::Failed(reason)) => return PollOutcome::Failed(reason),
            Ok(OperationStatus::InProgress) => {
                debug!("Operation still in progress ({}/{})", attempt, max_attempts);
            }
            Err(e) => {
                warn!(
                    "Status check {}/{} failed: {}",
                    attempt, max_attempts, e
                );
            }
        }
    }

    PollOutcome::TimedOut
}
