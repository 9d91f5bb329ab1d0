//! JSON handlers for user notices.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use loopctl_app::ports::{LoopControl, OfflineEventStore};
use loopctl_domain::notice::UserNotice;

use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<UserNotice>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/notices`: recent notices, newest first.
pub async fn list<L, O>(State(state): State<AppState<L, O>>) -> ListResponse
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.notices.recent()))
}
