//! Structured result report.
//!
//! Every handler invocation ends in exactly one `ModuleResult`, printed as
//! JSON on stdout. The process exits with code 1 when `failed` is true.

use crate::error::ModuleError;
use serde::Serialize;

/// Outcome of a single handler invocation.
#[derive(Debug, Serialize)]
pub struct ModuleResult {
    /// Whether remote state was mutated
    pub changed: bool,
    /// Whether the invocation failed
    pub failed: bool,
    /// Human-readable summary
    pub msg: String,
    /// Attributes of the resource the handler acted on, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<serde_json::Value>,
}

impl ModuleResult {
    /// Successful outcome with no resource attached.
    pub fn ok(changed: bool, msg: impl Into<String>) -> Self {
        Self { changed, failed: false, msg: msg.into(), resource: None }
    }

    /// Successful outcome carrying the resulting resource attributes.
    pub fn with_resource(changed: bool, msg: impl Into<String>, resource: serde_json::Value) -> Self {
        Self { changed, failed: false, msg: msg.into(), resource: Some(resource) }
    }

    /// Failed outcome. `changed` stays true when remote state was mutated
    /// before the failure (re-invocation is the recovery path).
    pub fn failure(changed: bool, msg: impl Into<String>) -> Self {
        Self { changed, failed: true, msg: msg.into(), resource: None }
    }

    /// Failed outcome from an error that escaped a handler.
    pub fn from_error(error: &ModuleError) -> Self {
        Self::failure(false, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_omitted_when_absent() {
        let result = ModuleResult::ok(false, "nothing to do");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("resource").is_none());
        assert_eq!(json["changed"], false);
        assert_eq!(json["failed"], false);
    }

    #[test]
    fn test_failure_keeps_changed_flag() {
        let result = ModuleResult::failure(true, "disk step failed");
        assert!(result.changed);
        assert!(result.failed);
    }
}
