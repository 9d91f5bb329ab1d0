//! Automation mode: how much authority the loop has over insulin delivery.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Automation mode. Only meaningful while the loop is enabled.
///
/// The mode is persisted independently of the enabled flag, so the last
/// used mode survives a disable/enable cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationMode {
    /// Advisory only; the user applies every dosing suggestion.
    #[default]
    Open,
    /// Delivery is only ever suspended on predicted low glucose.
    LowGlucoseSuspend,
    /// The loop adjusts delivery autonomously.
    Closed,
}

impl AutomationMode {
    /// All modes, in increasing order of automation.
    pub const ALL: [Self; 3] = [Self::Open, Self::LowGlucoseSuspend, Self::Closed];

    /// Value stored in the settings store.
    #[must_use]
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::LowGlucoseSuspend => "lgs",
            Self::Closed => "closed",
        }
    }

    /// Human-readable name carried by preference-change notifications.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Open => "open loop",
            Self::LowGlucoseSuspend => "low glucose suspend",
            Self::Closed => "closed loop",
        }
    }
}

impl fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for AutomationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "lgs" => Ok(Self::LowGlucoseSuspend),
            "closed" => Ok(Self::Closed),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}
