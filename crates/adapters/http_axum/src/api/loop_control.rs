//! JSON handlers for loop state and transitions.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use loopctl_app::ports::confirm::PresetAnswer;
use loopctl_app::ports::control::{CommandReport, Transition};
use loopctl_app::ports::{LoopControl, OfflineEventStore};
use loopctl_app::services::confirmation::Confirmation;
use loopctl_domain::action::LoopAction;
use loopctl_domain::command::CancelOrigin;
use loopctl_domain::display::{DisplayState, LoopSnapshot};
use loopctl_domain::id::CommandId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a loop transition.
///
/// `confirmed` records that the user accepted the action's description.
#[derive(Deserialize)]
pub struct ActionRequest {
    #[serde(flatten)]
    pub action: LoopAction,
    #[serde(default)]
    pub confirmed: bool,
}

/// Pump command issued by a transition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandBody {
    Dispatched { id: CommandId, origin: CancelOrigin },
    AlreadyInFlight { origin: CancelOrigin },
}

/// Result of a transition. Command outcomes arrive later as notices.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionBody {
    pub action: LoopAction,
    pub applied: bool,
    pub command: Option<CommandBody>,
}

impl From<Transition> for TransitionBody {
    fn from(transition: Transition) -> Self {
        let command = transition.command.map(|report| match report {
            CommandReport::Dispatched { id, origin, .. } => CommandBody::Dispatched { id, origin },
            CommandReport::AlreadyInFlight { origin } => CommandBody::AlreadyInFlight { origin },
        });
        Self {
            action: transition.action,
            applied: transition.applied,
            command,
        }
    }
}

/// Body returned when a transition still needs confirmation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmationBody {
    pub confirmation: String,
}

/// Possible responses from the snapshot endpoint.
pub enum SnapshotResponse {
    Ok(Json<LoopSnapshot>),
}

impl IntoResponse for SnapshotResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the display endpoint.
pub enum DisplayResponse {
    Ok(Json<DisplayState>),
}

impl IntoResponse for DisplayResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the apply endpoint.
pub enum ApplyResponse {
    Ok(Json<TransitionBody>),
    ConfirmationRequired(Json<ConfirmationBody>),
}

impl IntoResponse for ApplyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::ConfirmationRequired(json) => {
                (StatusCode::PRECONDITION_REQUIRED, json).into_response()
            }
        }
    }
}

/// `GET /api/loop`: current loop state and mode permissions.
pub async fn snapshot<L, O>(
    State(state): State<AppState<L, O>>,
) -> Result<SnapshotResponse, ApiError>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    let snapshot = state.control.snapshot().await?;
    Ok(SnapshotResponse::Ok(Json(snapshot)))
}

/// `GET /api/loop/display`: controls a presentation layer should offer.
pub async fn display<L, O>(
    State(state): State<AppState<L, O>>,
) -> Result<DisplayResponse, ApiError>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    let display = state.control.display_state().await?;
    Ok(DisplayResponse::Ok(Json(display)))
}

/// `POST /api/loop/actions`: request a loop transition.
pub async fn apply<L, O>(
    State(state): State<AppState<L, O>>,
    Json(request): Json<ActionRequest>,
) -> Result<ApplyResponse, ApiError>
where
    L: LoopControl + Send + Sync + 'static,
    O: OfflineEventStore + Send + Sync + 'static,
{
    let description = request.action.description();
    let confirmer = PresetAnswer(request.confirmed);
    match state
        .gateway
        .request(state.control.as_ref(), &confirmer, request.action)
        .await?
    {
        Confirmation::Confirmed(transition) => {
            Ok(ApplyResponse::Ok(Json(TransitionBody::from(transition))))
        }
        Confirmation::Declined => Ok(ApplyResponse::ConfirmationRequired(Json(
            ConfirmationBody {
                confirmation: description,
            },
        ))),
    }
}
