//! Shared application state for axum handlers.

use std::sync::Arc;

use loopctl_app::event_bus::InProcessEventBus;
use loopctl_app::notice_board::NoticeBoard;
use loopctl_app::ports::{LoopControl, OfflineEventStore};
use loopctl_app::services::confirmation::ConfirmationGateway;

/// Application state shared across all axum handlers.
///
/// Generic over the loop controller and the offline-event store to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`.
pub struct AppState<L, O> {
    /// Loop controller serving queries and transitions.
    pub control: Arc<L>,
    /// Gate every transition passes through.
    pub gateway: ConfirmationGateway,
    /// Audit records of loop downtime.
    pub offline_events: Arc<O>,
    /// Bus the controller publishes loop events on.
    pub event_bus: Arc<InProcessEventBus>,
    /// Notices raised for the user.
    pub notices: Arc<NoticeBoard>,
}

impl<L, O> Clone for AppState<L, O> {
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
            gateway: self.gateway,
            offline_events: Arc::clone(&self.offline_events),
            event_bus: Arc::clone(&self.event_bus),
            notices: Arc::clone(&self.notices),
        }
    }
}

impl<L, O> AppState<L, O>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// The bus and the notice board are the ones the controller was built
    /// with, so streams see everything it publishes.
    pub fn new(
        control: Arc<L>,
        gateway: ConfirmationGateway,
        offline_events: Arc<O>,
        event_bus: Arc<InProcessEventBus>,
        notices: Arc<NoticeBoard>,
    ) -> Self {
        Self {
            control,
            gateway,
            offline_events,
            event_bus,
            notices,
        }
    }
}
