//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod loop_control;
#[allow(clippy::missing_errors_doc)]
pub mod notices;
#[allow(clippy::missing_errors_doc)]
pub mod offline_events;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use loopctl_app::ports::{LoopControl, OfflineEventStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<L, O>() -> Router<AppState<L, O>>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    Router::new()
        // Loop
        .route("/loop", get(loop_control::snapshot::<L, O>))
        .route("/loop/display", get(loop_control::display::<L, O>))
        .route("/loop/actions", post(loop_control::apply::<L, O>))
        // Notices
        .route("/notices", get(notices::list::<L, O>))
        .route("/notices/stream", get(sse::notices::<L, O>))
        // Offline events
        .route("/offline-events", get(offline_events::list::<L, O>))
        // Loop events
        .route("/events/stream", get(sse::events::<L, O>))
}
