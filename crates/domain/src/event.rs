//! Loop events: notifications exchanged over the event bus.
//!
//! Events are published only after the state they describe has been
//! durably written, so subscribers always observe persisted state.

use serde::{Deserialize, Serialize};

/// Reason attached to overview refreshes triggered by the loop menu.
pub const SUSPEND_MENU: &str = "suspendmenu";

/// A notification on the loop event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    /// A persisted preference (the automation mode) changed.
    PreferenceChanged { description: String },
    /// Views showing loop status should re-render.
    RefreshOverview { reason: String },
    /// Inbound: the dosing algorithm produced a new open-loop suggestion.
    NewOpenLoopNotification,
}

impl LoopEvent {
    #[must_use]
    pub fn preference_changed(description: impl Into<String>) -> Self {
        Self::PreferenceChanged {
            description: description.into(),
        }
    }

    #[must_use]
    pub fn refresh_overview(reason: impl Into<String>) -> Self {
        Self::RefreshOverview {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_with_type_tag() {
        let json = serde_json::to_value(LoopEvent::preference_changed("closed loop")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "preference_changed", "description": "closed loop"})
        );
    }

    #[test]
    fn should_deserialize_inbound_notification() {
        let event: LoopEvent =
            serde_json::from_value(serde_json::json!({"type": "new_open_loop_notification"}))
                .unwrap();
        assert_eq!(event, LoopEvent::NewOpenLoopNotification);
    }
}
