//! Server-Sent Events (SSE) streams for real-time updates.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use loopctl_app::ports::{LoopControl, OfflineEventStore};

use crate::state::AppState;

fn json_stream<T>(
    receiver: broadcast::Receiver<T>,
) -> impl tokio_stream::Stream<Item = Result<Event, Infallible>>
where
    T: Serialize + Clone + Send + 'static,
{
    BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(item) => match serde_json::to_string(&item) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize SSE payload");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some items were dropped");
            None
        }
    })
}

/// `GET /api/events/stream`: loop events as they are published.
///
/// Events only reach the stream after the state they describe was
/// persisted, so a client re-reading `/api/loop` on each event sees it.
pub async fn events<L, O>(
    State(state): State<AppState<L, O>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    Sse::new(json_stream(state.event_bus.subscribe())).keep_alive(KeepAlive::default())
}

/// `GET /api/notices/stream`: toasts and alerts as they are raised.
pub async fn notices<L, O>(
    State(state): State<AppState<L, O>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    Sse::new(json_stream(state.notices.subscribe())).keep_alive(KeepAlive::default())
}
