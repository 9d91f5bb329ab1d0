//! Offline records: audit trail of periods the loop was not running.

use serde::{Deserialize, Serialize};

use crate::id::OfflineEventId;
use crate::time::Timestamp;

/// Nominal offline duration recorded when the loop is disabled.
///
/// The real duration is unknown until the loop is re-enabled.
pub const UNKNOWN_OFFLINE_MINUTES: u32 = 24 * 60;

/// Why an offline record was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineReason {
    LoopDisabled,
    LoopEnabled,
    Resumed,
}

impl OfflineReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoopDisabled => "loop_disabled",
            Self::LoopEnabled => "loop_enabled",
            Self::Resumed => "resumed",
        }
    }
}

impl std::str::FromStr for OfflineReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loop_disabled" => Ok(Self::LoopDisabled),
            "loop_enabled" => Ok(Self::LoopEnabled),
            "resumed" => Ok(Self::Resumed),
            other => Err(format!("unknown offline reason `{other}`")),
        }
    }
}

/// A period during which the loop was (or is assumed to be) offline.
///
/// A zero duration marks the loop online again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineEvent {
    pub id: OfflineEventId,
    pub created_at: Timestamp,
    pub duration_minutes: u32,
    pub reason: OfflineReason,
}

impl OfflineEvent {
    #[must_use]
    pub fn new(reason: OfflineReason, duration_minutes: u32, created_at: Timestamp) -> Self {
        Self {
            id: OfflineEventId::new(),
            created_at,
            duration_minutes,
            reason,
        }
    }

    /// Record that the loop is back online.
    #[must_use]
    pub fn online(reason: OfflineReason, created_at: Timestamp) -> Self {
        Self::new(reason, 0, created_at)
    }

    #[must_use]
    pub fn marks_online(&self) -> bool {
        self.duration_minutes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_mark_zero_duration_record_as_online() {
        let event = OfflineEvent::online(OfflineReason::Resumed, now());
        assert!(event.marks_online());
    }

    #[test]
    fn should_keep_nominal_day_for_disable_record() {
        let event = OfflineEvent::new(OfflineReason::LoopDisabled, UNKNOWN_OFFLINE_MINUTES, now());
        assert!(!event.marks_online());
        assert_eq!(event.duration_minutes, 1440);
    }

    #[test]
    fn should_parse_stored_reason() {
        for reason in [
            OfflineReason::LoopDisabled,
            OfflineReason::LoopEnabled,
            OfflineReason::Resumed,
        ] {
            assert_eq!(reason.as_str().parse::<OfflineReason>().unwrap(), reason);
        }
        assert!("paused".parse::<OfflineReason>().is_err());
    }
}
