//! JSON handlers for offline records.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use loopctl_app::ports::{LoopControl, OfflineEventStore};
use loopctl_domain::offline::OfflineEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<OfflineEvent>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/offline-events`: recent offline records, newest first.
pub async fn list<L, O>(State(state): State<AppState<L, O>>) -> Result<ListResponse, ApiError>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    let events = state.offline_events.recent(100).await?;
    Ok(ListResponse::Ok(Json(events)))
}
