//! Bounded waiting for platform actions.
//!
//! Every mutating ThinkAgile CP call returns an action UUID. This module
//! holds the single polling loop that drives all async waits, with a fixed
//! interval and an overall timeout, so no handler can loop indefinitely.

use crate::error::ModuleError;
use std::time::Duration;
use tacp_client::{ActionStatus, TacpClientTrait};
use tokio::time::Instant;
use tracing::debug;

/// Poll interval between action status reads
pub const ACTION_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Overall timeout for ordinary actions (create, delete, power)
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(60);
/// Overall timeout for marketplace template downloads
pub const TEMPLATE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Terminal outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The action reached the Completed state
    Completed,
    /// The action reached the Failed state, with the platform's message
    Failed(String),
    /// The timeout elapsed before the action reached a terminal state
    TimedOut,
}

/// Polls an action until it reaches a terminal state or the timeout elapses.
pub async fn wait_for_action(
    client: &dyn TacpClientTrait,
    action_uuid: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<WaitOutcome, ModuleError> {
    let started = Instant::now();
    loop {
        let action = client.get_action(action_uuid).await?;
        debug!("Action {} is {:?}", action_uuid, action.status);
        match action.status {
            ActionStatus::Completed => return Ok(WaitOutcome::Completed),
            ActionStatus::Failed => {
                return Ok(WaitOutcome::Failed(
                    action
                        .message
                        .unwrap_or_else(|| "action failed without a message".to_string()),
                ));
            }
            ActionStatus::InProgress | ActionStatus::Queued => {
                if started.elapsed() >= timeout {
                    return Ok(WaitOutcome::TimedOut);
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}
