//! In-process loop event bus.
//!
//! Every subscriber gets its own copy of each event published after it
//! subscribed. The mode controller publishes here, and the same bus carries
//! inbound notifications (such as a new open-loop suggestion) back to it.

use tokio::sync::broadcast;

use loopctl_domain::error::LoopError;
use loopctl_domain::event::LoopEvent;

use crate::ports::EventPublisher;

/// Broadcast bus for [`LoopEvent`]s.
///
/// A subscriber that falls more than `capacity` events behind loses the
/// oldest ones and is told how many it missed.
pub struct InProcessEventBus {
    sender: broadcast::Sender<LoopEvent>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    async fn publish(&self, event: LoopEvent) -> Result<(), LoopError> {
        match self.sender.send(event) {
            Ok(delivered) => tracing::trace!(delivered, "loop event published"),
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(?event, "loop event published without subscribers");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(LoopEvent::preference_changed("closed loop"))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, LoopEvent::preference_changed("closed loop"));
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(LoopEvent::refresh_overview("suspendmenu"))
            .await
            .unwrap();

        assert_eq!(
            rx1.recv().await.unwrap(),
            LoopEvent::refresh_overview("suspendmenu")
        );
        assert_eq!(
            rx2.recv().await.unwrap(),
            LoopEvent::refresh_overview("suspendmenu")
        );
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        let result = bus.publish(LoopEvent::NewOpenLoopNotification).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(LoopEvent::refresh_overview("early"))
            .await
            .unwrap();

        let mut rx = bus.subscribe();
        bus.publish(LoopEvent::refresh_overview("late"))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), LoopEvent::refresh_overview("late"));
    }
}
