//! User actions: every transition the loop menu can request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mode::AutomationMode;

/// Suspension lengths offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SuspendDuration {
    OneHour,
    TwoHours,
    ThreeHours,
    TenHours,
}

impl SuspendDuration {
    pub const ALL: [Self; 4] = [Self::OneHour, Self::TwoHours, Self::ThreeHours, Self::TenHours];

    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
            Self::TenHours => 600,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::ThreeHours => "3h",
            Self::TenHours => "10h",
        }
    }
}

impl TryFrom<u32> for SuspendDuration {
    type Error = ValidationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.minutes() == minutes)
            .ok_or(ValidationError::InvalidSuspendDuration(minutes))
    }
}

impl From<SuspendDuration> for u32 {
    fn from(duration: SuspendDuration) -> Self {
        duration.minutes()
    }
}

/// Pump disconnection lengths offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DisconnectDuration {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    ThreeHours,
}

impl DisconnectDuration {
    pub const ALL: [Self; 5] = [
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::ThreeHours,
    ];

    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
        }
    }

    /// Whether offering this step depends on the pump's advertised
    /// temp-basal duration granularity.
    #[must_use]
    pub fn needs_pump_step_support(self) -> bool {
        matches!(self, Self::FifteenMinutes | Self::ThirtyMinutes)
    }

    fn label(self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15 min",
            Self::ThirtyMinutes => "30 min",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::ThreeHours => "3h",
        }
    }
}

impl TryFrom<u32> for DisconnectDuration {
    type Error = ValidationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.minutes() == minutes)
            .ok_or(ValidationError::InvalidDisconnectDuration(minutes))
    }
}

impl From<DisconnectDuration> for u32 {
    fn from(duration: DisconnectDuration) -> Self {
        duration.minutes()
    }
}

/// A transition requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoopAction {
    SelectMode { mode: AutomationMode },
    Disable,
    Enable,
    Resume,
    Reconnect,
    Suspend { duration: SuspendDuration },
    Disconnect { duration: DisconnectDuration },
}

impl LoopAction {
    /// Confirmation text shown before the action is applied.
    ///
    /// Each action has its own text so the user always knows exactly what
    /// they are agreeing to.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::SelectMode {
                mode: AutomationMode::Closed,
            } => "Closed Loop".to_string(),
            Self::SelectMode {
                mode: AutomationMode::LowGlucoseSuspend,
            } => "Low Glucose Suspend".to_string(),
            Self::SelectMode {
                mode: AutomationMode::Open,
            } => "Open Loop".to_string(),
            Self::Disable => "Disable loop".to_string(),
            Self::Enable => "Enable loop".to_string(),
            Self::Resume => "Resume".to_string(),
            Self::Reconnect => "Reconnect".to_string(),
            Self::Suspend { duration } => format!("Suspend loop for {}", duration.label()),
            Self::Disconnect { duration } => format!("Disconnect pump for {}", duration.label()),
        }
    }
}

impl fmt::Display for LoopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn every_action() -> Vec<LoopAction> {
        let mut actions: Vec<LoopAction> = AutomationMode::ALL
            .into_iter()
            .map(|mode| LoopAction::SelectMode { mode })
            .collect();
        actions.extend([
            LoopAction::Disable,
            LoopAction::Enable,
            LoopAction::Resume,
            LoopAction::Reconnect,
        ]);
        actions.extend(
            SuspendDuration::ALL
                .into_iter()
                .map(|duration| LoopAction::Suspend { duration }),
        );
        actions.extend(
            DisconnectDuration::ALL
                .into_iter()
                .map(|duration| LoopAction::Disconnect { duration }),
        );
        actions
    }

    #[test]
    fn should_give_every_action_a_distinct_description() {
        let actions = every_action();
        let descriptions: HashSet<String> = actions.iter().map(LoopAction::description).collect();
        assert_eq!(descriptions.len(), actions.len());
        assert_eq!(actions.len(), 16);
    }

    #[test]
    fn should_describe_suspend_and_disconnect_with_duration() {
        assert_eq!(
            LoopAction::Suspend {
                duration: SuspendDuration::TenHours
            }
            .description(),
            "Suspend loop for 10h"
        );
        assert_eq!(
            LoopAction::Disconnect {
                duration: DisconnectDuration::FifteenMinutes
            }
            .description(),
            "Disconnect pump for 15 min"
        );
    }

    #[test]
    fn should_accept_only_offered_suspend_minutes() {
        assert_eq!(
            SuspendDuration::try_from(600),
            Ok(SuspendDuration::TenHours)
        );
        assert_eq!(
            SuspendDuration::try_from(90),
            Err(ValidationError::InvalidSuspendDuration(90))
        );
    }

    #[test]
    fn should_accept_only_offered_disconnect_minutes() {
        assert_eq!(
            DisconnectDuration::try_from(30),
            Ok(DisconnectDuration::ThirtyMinutes)
        );
        assert_eq!(
            DisconnectDuration::try_from(45),
            Err(ValidationError::InvalidDisconnectDuration(45))
        );
    }

    #[test]
    fn should_flag_only_short_disconnects_as_step_dependent() {
        let gated: Vec<u32> = DisconnectDuration::ALL
            .into_iter()
            .filter(|d| d.needs_pump_step_support())
            .map(DisconnectDuration::minutes)
            .collect();
        assert_eq!(gated, vec![15, 30]);
    }

    #[test]
    fn should_deserialize_tagged_action_with_minutes() {
        let action: LoopAction =
            serde_json::from_value(serde_json::json!({"action": "suspend", "duration": 120}))
                .unwrap();
        assert_eq!(
            action,
            LoopAction::Suspend {
                duration: SuspendDuration::TwoHours
            }
        );
    }

    #[test]
    fn should_reject_action_with_unoffered_minutes() {
        let result: Result<LoopAction, _> =
            serde_json::from_value(serde_json::json!({"action": "disconnect", "duration": 45}));
        assert!(result.is_err());
    }

    #[test]
    fn should_deserialize_mode_selection() {
        let action: LoopAction = serde_json::from_value(
            serde_json::json!({"action": "select_mode", "mode": "closed"}),
        )
        .unwrap();
        assert_eq!(
            action,
            LoopAction::SelectMode {
                mode: AutomationMode::Closed
            }
        );
    }
}
