//! User notices: messages the presentation layer must show.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

pub const NO_PROFILE: &str = "No profile set";
pub const TEMP_BASAL_DELIVERY_ERROR: &str = "Temp basal delivery error";

/// Sound played with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSound {
    BolusError,
}

/// How loudly a notice must be surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    /// Transient, non-blocking message.
    Toast { message: String },
    /// Blocking alert that demands acknowledgement.
    Alert {
        title: String,
        detail: String,
        sound: AlertSound,
    },
}

/// A notice raised at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub raised_at: Timestamp,
    #[serde(flatten)]
    pub kind: NoticeKind,
}

impl UserNotice {
    #[must_use]
    pub fn toast(message: impl Into<String>, raised_at: Timestamp) -> Self {
        Self {
            raised_at,
            kind: NoticeKind::Toast {
                message: message.into(),
            },
        }
    }

    #[must_use]
    pub fn alert(
        title: impl Into<String>,
        detail: impl Into<String>,
        sound: AlertSound,
        raised_at: Timestamp,
    ) -> Self {
        Self {
            raised_at,
            kind: NoticeKind::Alert {
                title: title.into(),
                detail: detail.into(),
                sound,
            },
        }
    }

    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self.kind, NoticeKind::Alert { .. })
    }
}
