//! Reconciliation logic for the ThinkAgile CP command handlers.
//!
//! One submodule per handler:
//! - `instance`: application instances (create, delete, power transitions)
//! - `network`: VLAN and VNET networks
//! - `datacenter`: virtual datacenters with resource allocations
//! - `info`: read-only inventory queries

pub mod datacenter;
#[cfg(test)]
mod datacenter_test;
pub mod info;
#[cfg(test)]
mod info_test;
pub mod instance;
#[cfg(test)]
mod instance_test;
pub mod network;
#[cfg(test)]
mod network_test;

use crate::error::ModuleError;
use crate::wait::{self, WaitOutcome, ACTION_POLL_INTERVAL};
use std::time::Duration;
use tacp_client::{ActionResponse, TacpClientTrait, TacpError};

/// Waits for the action behind a mutating response to finish.
///
/// A response without an action UUID is treated as synchronous success. A
/// Failed terminal state surfaces as a platform rejection; an elapsed timeout
/// surfaces as `ModuleError::Timeout` naming the operation.
pub(crate) async fn await_action(
    client: &dyn TacpClientTrait,
    response: &ActionResponse,
    what: &str,
    timeout: Duration,
) -> Result<(), ModuleError> {
    let Some(action_uuid) = &response.action_uuid else {
        return Ok(());
    };
    match wait::wait_for_action(client, action_uuid, ACTION_POLL_INTERVAL, timeout).await? {
        WaitOutcome::Completed => Ok(()),
        WaitOutcome::Failed(message) => Err(ModuleError::Remote(TacpError::Api(format!(
            "{what} failed: {message}"
        )))),
        WaitOutcome::TimedOut => Err(ModuleError::Timeout(format!(
            "timed out waiting for {what}"
        ))),
    }
}

/// Turns a by-name lookup miss into a validation error naming the resource.
pub(crate) fn require<T>(
    resource: Option<T>,
    kind: &str,
    name: &str,
) -> Result<T, ModuleError> {
    resource.ok_or_else(|| {
        ModuleError::Validation(format!("{kind} with name {name} not found"))
    })
}
