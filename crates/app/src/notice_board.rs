//! In-process notice board: keeps recent user notices and broadcasts new ones.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::broadcast;

use loopctl_domain::notice::{NoticeKind, UserNotice};

use crate::ports::UserNotifier;

/// Holds the most recent notices for presentation layers that poll, and
/// broadcasts each new notice to those that listen.
pub struct NoticeBoard {
    recent: Mutex<VecDeque<UserNotice>>,
    capacity: usize,
    sender: broadcast::Sender<UserNotice>,
}

impl NoticeBoard {
    /// Create a board retaining at most `capacity` notices.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            sender,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UserNotice> {
        self.sender.subscribe()
    }

    /// Retained notices, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<UserNotice> {
        self.lock_recent().iter().rev().cloned().collect()
    }

    fn lock_recent(&self) -> std::sync::MutexGuard<'_, VecDeque<UserNotice>> {
        self.recent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl UserNotifier for NoticeBoard {
    async fn notify(&self, notice: UserNotice) {
        match &notice.kind {
            NoticeKind::Toast { message } => tracing::info!(%message, "toast raised"),
            NoticeKind::Alert { title, detail, .. } => {
                tracing::error!(%title, %detail, "alert raised");
            }
        }
        {
            let mut recent = self.lock_recent();
            if recent.len() == self.capacity {
                recent.pop_front();
            }
            if self.capacity > 0 {
                recent.push_back(notice.clone());
            }
        }
        let _ = self.sender.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopctl_domain::notice::AlertSound;
    use loopctl_domain::time::now;

    #[tokio::test]
    async fn should_list_notices_newest_first() {
        let board = NoticeBoard::new(8);
        board.notify(UserNotice::toast("first", now())).await;
        board.notify(UserNotice::toast("second", now())).await;

        let recent = board.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(
            recent[0].kind,
            NoticeKind::Toast {
                message: "second".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_drop_oldest_notice_when_full() {
        let board = NoticeBoard::new(2);
        for message in ["a", "b", "c"] {
            board.notify(UserNotice::toast(message, now())).await;
        }

        let messages: Vec<String> = board
            .recent()
            .into_iter()
            .filter_map(|n| match n.kind {
                NoticeKind::Toast { message } => Some(message),
                NoticeKind::Alert { .. } => None,
            })
            .collect();
        assert_eq!(messages, vec!["c".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn should_broadcast_alert_to_subscriber() {
        let board = NoticeBoard::new(4);
        let mut rx = board.subscribe();

        board
            .notify(UserNotice::alert(
                "Temp basal delivery error",
                "timeout",
                AlertSound::BolusError,
                now(),
            ))
            .await;

        assert!(rx.recv().await.unwrap().is_alert());
    }
}
