//! Display state: which loop controls a presentation layer should offer.
//!
//! Everything here is derived; the presentation layer renders a
//! [`DisplayState`] as-is and never re-derives availability itself.

use serde::{Deserialize, Serialize};

use crate::action::{DisconnectDuration, SuspendDuration};
use crate::constraint::ConstraintResult;
use crate::loop_state::{LoopState, LoopStatus};
use crate::mode::AutomationMode;
use crate::time::Timestamp;

/// Temp-basal duration steps the active pump advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PumpCapabilities {
    pub disconnect_15m: bool,
    pub disconnect_30m: bool,
}

impl PumpCapabilities {
    /// Whether the pump can honour a disconnect of exactly `duration`.
    #[must_use]
    pub fn supports(&self, duration: DisconnectDuration) -> bool {
        match duration {
            DisconnectDuration::FifteenMinutes => self.disconnect_15m,
            DisconnectDuration::ThirtyMinutes => self.disconnect_30m,
            _ => true,
        }
    }
}

/// Controls to offer, plus the facts they were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub enabled: bool,
    pub mode: AutomationMode,
    pub status: LoopStatus,
    pub suspended_until: Option<Timestamp>,
    pub disconnected_until: Option<Timestamp>,
    /// Modes the user may switch to (never includes the active one).
    pub selectable_modes: Vec<AutomationMode>,
    pub can_enable: bool,
    pub can_disable: bool,
    pub suspend_options: Vec<SuspendDuration>,
    pub can_resume: bool,
    pub disconnect_options: Vec<DisconnectDuration>,
    pub can_reconnect: bool,
}

/// Answers to the read-only loop queries at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSnapshot {
    pub enabled: bool,
    pub suspended: bool,
    pub disconnected: bool,
    pub mode: AutomationMode,
    pub closed_loop_allowed: ConstraintResult,
    pub low_glucose_suspend_allowed: ConstraintResult,
}

impl LoopSnapshot {
    #[must_use]
    pub fn new(
        state: &LoopState,
        closed_loop: ConstraintResult,
        low_glucose_suspend: ConstraintResult,
        now: Timestamp,
    ) -> Self {
        Self {
            enabled: state.is_enabled(),
            suspended: state.is_suspended(now),
            disconnected: state.is_disconnected(now),
            mode: state.mode,
            closed_loop_allowed: closed_loop,
            low_glucose_suspend_allowed: low_glucose_suspend,
        }
    }
}

/// Derive the controls to offer for `state` at `now`.
#[must_use]
pub fn derive_display_state(
    state: &LoopState,
    closed_loop: ConstraintResult,
    low_glucose_suspend: ConstraintResult,
    pump: PumpCapabilities,
    now: Timestamp,
) -> DisplayState {
    let status = state.status(now);

    let selectable_modes = if state.enabled {
        AutomationMode::ALL
            .into_iter()
            .filter(|mode| *mode != state.mode)
            .filter(|mode| match mode {
                AutomationMode::Closed => closed_loop.is_allowed(),
                AutomationMode::LowGlucoseSuspend => low_glucose_suspend.is_allowed(),
                AutomationMode::Open => true,
            })
            .collect()
    } else {
        Vec::new()
    };

    let suspend_options = if state.enabled && status == LoopStatus::Active {
        SuspendDuration::ALL.to_vec()
    } else {
        Vec::new()
    };

    let disconnect_options = if status == LoopStatus::Disconnected {
        Vec::new()
    } else {
        DisconnectDuration::ALL
            .into_iter()
            .filter(|duration| pump.supports(*duration))
            .collect()
    };

    DisplayState {
        enabled: state.enabled,
        mode: state.mode,
        status,
        suspended_until: state.suspended_until,
        disconnected_until: state.disconnected_until,
        selectable_modes,
        can_enable: !state.enabled,
        can_disable: state.enabled,
        suspend_options,
        can_resume: state.enabled && status == LoopStatus::Suspended,
        disconnect_options,
        can_reconnect: status == LoopStatus::Disconnected,
    }
}
