//! Constraint results: whether an automation mode is currently permitted.
//!
//! A result is produced per query and never cached: training progress and
//! safety gating can change between two checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mode::AutomationMode;

/// Training milestone gating an automation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Low-glucose-suspend training has been started.
    LowGlucoseSuspend,
    /// Closed-loop training has been started.
    ClosedLoop,
}

impl Objective {
    /// Settings key recording that the milestone was reached.
    #[must_use]
    pub fn settings_key(self) -> &'static str {
        match self {
            Self::LowGlucoseSuspend => "objective_lgs_started",
            Self::ClosedLoop => "objective_closed_loop_started",
        }
    }
}

/// Why a mode is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "objective", rename_all = "snake_case")]
pub enum DenialReason {
    /// The training milestone has not been reached yet.
    ObjectiveNotStarted(Objective),
    /// Closed-loop operation is switched off by configuration.
    DisabledBySafetyPolicy,
    /// Training state could not be read; treated as not permitted.
    EligibilityUnavailable,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectiveNotStarted(Objective::LowGlucoseSuspend) => {
                f.write_str("low glucose suspend objective not started")
            }
            Self::ObjectiveNotStarted(Objective::ClosedLoop) => {
                f.write_str("closed loop objective not started")
            }
            Self::DisabledBySafetyPolicy => f.write_str("disabled by safety policy"),
            Self::EligibilityUnavailable => f.write_str("eligibility could not be determined"),
        }
    }
}

/// Outcome of a single capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum ConstraintResult {
    Allowed,
    Denied(DenialReason),
}

impl ConstraintResult {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Turn a denial into a [`ConstraintDenied`] error for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintDenied`] when the result is [`Denied`](Self::Denied).
    pub fn require(self, mode: AutomationMode) -> Result<(), ConstraintDenied> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(ConstraintDenied { mode, reason }),
        }
    }
}

/// A mode was requested while its constraint denied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{mode} mode denied: {reason}")]
pub struct ConstraintDenied {
    pub mode: AutomationMode,
    pub reason: DenialReason,
}
