//! Loop state: the authoritative record of what the loop is allowed to do.
//!
//! The user-facing [`LoopStatus`] is always derived from the stored windows
//! and the current time; it is never stored on its own.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mode::AutomationMode;
use crate::time::{Timestamp, minutes_after};

/// Persisted loop configuration and suspension windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState {
    /// Whether the automation subsystem runs at all.
    pub enabled: bool,
    /// Last selected mode; kept while disabled.
    pub mode: AutomationMode,
    /// Automation is suspended while this lies in the future.
    pub suspended_until: Option<Timestamp>,
    /// The pump is disconnected while this lies in the future.
    pub disconnected_until: Option<Timestamp>,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: AutomationMode::Open,
            suspended_until: None,
            disconnected_until: None,
        }
    }
}

/// User-facing status at a given instant. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    Active,
    Suspended,
    Disconnected,
}

impl LoopState {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` iff `suspended_until` is set and later than `now`.
    #[must_use]
    pub fn is_suspended(&self, now: Timestamp) -> bool {
        self.suspended_until.is_some_and(|until| until > now)
    }

    /// `true` iff `disconnected_until` is set and later than `now`.
    #[must_use]
    pub fn is_disconnected(&self, now: Timestamp) -> bool {
        self.disconnected_until.is_some_and(|until| until > now)
    }

    /// Derived status. Disconnection takes precedence over suspension.
    #[must_use]
    pub fn status(&self, now: Timestamp) -> LoopStatus {
        if self.is_disconnected(now) {
            LoopStatus::Disconnected
        } else if self.is_suspended(now) {
            LoopStatus::Suspended
        } else {
            LoopStatus::Active
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_mode(&mut self, mode: AutomationMode) {
        self.mode = mode;
    }

    /// Suspend automation for `minutes` starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDuration`] when `minutes` is zero.
    pub fn suspend_for(&mut self, minutes: u32, now: Timestamp) -> Result<(), ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        self.suspended_until = Some(minutes_after(now, minutes));
        Ok(())
    }

    /// Mark the pump disconnected for `minutes` starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDuration`] when `minutes` is zero.
    pub fn disconnect_for(&mut self, minutes: u32, now: Timestamp) -> Result<(), ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        self.disconnected_until = Some(minutes_after(now, minutes));
        Ok(())
    }

    pub fn clear_suspend(&mut self) {
        self.suspended_until = None;
    }

    pub fn clear_disconnect(&mut self) {
        self.disconnected_until = None;
    }
}
