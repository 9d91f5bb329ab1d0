//! Event bus port: publish/subscribe for loop events.

use std::future::Future;

use loopctl_domain::error::LoopError;
use loopctl_domain::event::LoopEvent;

/// Publishes loop events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: LoopEvent) -> impl Future<Output = Result<(), LoopError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: LoopEvent) -> impl Future<Output = Result<(), LoopError>> + Send {
        (**self).publish(event)
    }
}
