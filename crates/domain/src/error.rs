//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`LoopError`]
//! via `#[from]`. Every variant is terminal for the single requested
//! transition: nothing in the core retries on its own.

pub use crate::constraint::ConstraintDenied;

/// Top-level error for a requested loop transition.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// No valid dosing profile exists; the action is aborted untouched.
    #[error("no valid dosing profile")]
    NoProfile,

    /// The requested automation mode is not currently permitted.
    #[error("automation mode not permitted")]
    ConstraintDenied(#[from] ConstraintDenied),

    /// The loop is not in a state where the transition applies.
    #[error("transition not allowed in current state")]
    Precondition(#[from] PreconditionError),

    /// The request itself is malformed.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// State could not be durably written or read.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Stored or requested mode key is not recognised.
    #[error("unknown automation mode `{0}`")]
    UnknownMode(String),

    /// Suspension length is not one of the offered durations.
    #[error("unsupported suspend duration of {0} minutes")]
    InvalidSuspendDuration(u32),

    /// Disconnection length is not one of the offered durations.
    #[error("unsupported disconnect duration of {0} minutes")]
    InvalidDisconnectDuration(u32),

    /// A window of zero minutes was requested.
    #[error("duration must be greater than zero")]
    ZeroDuration,
}

/// The transition is well-formed but the current loop state forbids it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("loop is disabled")]
    LoopDisabled,

    #[error("loop is already enabled")]
    AlreadyEnabled,

    #[error("loop is already disabled")]
    AlreadyDisabled,

    #[error("pump is disconnected")]
    PumpDisconnected,

    #[error("pump is already disconnected")]
    AlreadyDisconnected,

    #[error("pump is not disconnected")]
    NotDisconnected,

    #[error("loop is already suspended")]
    AlreadySuspended,

    #[error("loop is not suspended")]
    NotSuspended,

    #[error("pump does not support a {minutes} minute disconnect step")]
    DisconnectStepUnsupported { minutes: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::DenialReason;
    use crate::mode::AutomationMode;

    #[test]
    fn should_convert_precondition_error_into_loop_error() {
        let err: LoopError = PreconditionError::PumpDisconnected.into();
        assert!(matches!(
            err,
            LoopError::Precondition(PreconditionError::PumpDisconnected)
        ));
    }

    #[test]
    fn should_convert_constraint_denial_into_loop_error() {
        let err: LoopError = ConstraintDenied {
            mode: AutomationMode::Closed,
            reason: DenialReason::DisabledBySafetyPolicy,
        }
        .into();
        assert!(matches!(err, LoopError::ConstraintDenied(ref d) if d.mode == AutomationMode::Closed));
    }

    #[test]
    fn should_expose_storage_source() {
        let io = std::io::Error::other("disk full");
        let err = LoopError::Storage(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn should_describe_unsupported_disconnect_step() {
        let err = PreconditionError::DisconnectStepUnsupported { minutes: 15 };
        assert_eq!(
            err.to_string(),
            "pump does not support a 15 minute disconnect step"
        );
    }
}
