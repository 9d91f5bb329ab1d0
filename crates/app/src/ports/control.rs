//! Loop control port: the driving side used by presentation layers.

use std::future::Future;

use tokio::task::JoinHandle;

use loopctl_domain::action::LoopAction;
use loopctl_domain::command::{CancelOrigin, CommandOutcome};
use loopctl_domain::display::{DisplayState, LoopSnapshot};
use loopctl_domain::error::LoopError;
use loopctl_domain::event::LoopEvent;
use loopctl_domain::id::CommandId;

/// What happened to the pump command a transition asked for.
#[derive(Debug)]
pub enum CommandReport {
    /// Sent to the pump. The handle resolves once the outcome has been
    /// surfaced to the user; the transition itself never waits for it.
    Dispatched {
        id: CommandId,
        origin: CancelOrigin,
        completion: JoinHandle<CommandOutcome>,
    },
    /// A command from the same origin was still pending; nothing was sent.
    AlreadyInFlight { origin: CancelOrigin },
}

/// Result of an accepted transition request.
#[derive(Debug)]
pub struct Transition {
    pub action: LoopAction,
    /// `false` when the request was a no-op (e.g. selecting the active mode).
    pub applied: bool,
    pub command: Option<CommandReport>,
}

impl Transition {
    #[must_use]
    pub fn applied(action: LoopAction) -> Self {
        Self {
            action,
            applied: true,
            command: None,
        }
    }

    #[must_use]
    pub fn unchanged(action: LoopAction) -> Self {
        Self {
            action,
            applied: false,
            command: None,
        }
    }

    #[must_use]
    pub fn with_command(mut self, report: CommandReport) -> Self {
        self.command = Some(report);
        self
    }

    /// Wait until the dispatched command's outcome has been reported.
    ///
    /// Returns `None` when no command was dispatched by this transition.
    pub async fn command_outcome(self) -> Option<CommandOutcome> {
        match self.command? {
            CommandReport::Dispatched { completion, .. } => Some(
                completion
                    .await
                    .unwrap_or_else(|err| CommandOutcome::failure(err.to_string())),
            ),
            CommandReport::AlreadyInFlight { .. } => None,
        }
    }
}

/// Operations a presentation layer may invoke on the loop core.
pub trait LoopControl {
    /// The six read-only derived queries, evaluated now.
    fn snapshot(&self) -> impl Future<Output = Result<LoopSnapshot, LoopError>> + Send;

    /// Controls to offer right now.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::NoProfile`] when no valid dosing profile exists.
    fn display_state(&self) -> impl Future<Output = Result<DisplayState, LoopError>> + Send;

    /// Validate and apply a user-requested transition.
    fn apply(
        &self,
        action: LoopAction,
    ) -> impl Future<Output = Result<Transition, LoopError>> + Send;

    /// React to an inbound bus event.
    fn handle_event(&self, event: &LoopEvent)
    -> impl Future<Output = Result<(), LoopError>> + Send;
}
