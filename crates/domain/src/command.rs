//! Pump command outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a command issued to the pump, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Success,
    Failure { detail: String },
}

impl CommandOutcome {
    #[must_use]
    pub fn failure(detail: impl Into<String>) -> Self {
        Self::Failure {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The transition that asked for a temp basal cancellation.
///
/// At most one cancellation per origin is outstanding at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOrigin {
    DisableLoop,
    Resume,
}

impl fmt::Display for CancelOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisableLoop => f.write_str("disable_loop"),
            Self::Resume => f.write_str("resume"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_failure_from_detail() {
        let outcome = CommandOutcome::failure("pump unreachable");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            CommandOutcome::Failure {
                detail: "pump unreachable".to_string()
            }
        );
    }

    #[test]
    fn should_serialize_outcome_with_tag() {
        let json = serde_json::to_value(CommandOutcome::failure("timeout")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "failure", "detail": "timeout"})
        );
    }
}
