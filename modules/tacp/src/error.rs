//! Module-level error types.
//!
//! This module defines the error taxonomy shared by all command handlers.
//! Every error ends up converted into a structured failure result at the
//! binary boundary; nothing propagates past it.

use tacp_client::TacpError;
use thiserror::Error;

/// Errors that can occur while running a command handler.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Bad task parameters, detected before any remote call
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// ThinkAgile CP API error (HTTP, auth, platform rejection)
    #[error("ThinkAgile CP error: {0}")]
    Remote(#[from] TacpError),

    /// A bounded wait elapsed without the action reaching a terminal state
    #[error("Timed out: {0}")]
    Timeout(String),
}
