//! Command executor: issues pump commands without blocking transitions.
//!
//! The pump call runs on its own task; the caller gets a [`PendingCommand`]
//! that resolves exactly once with the [`CommandOutcome`]. At most one
//! cancellation per [`CancelOrigin`] is outstanding at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use loopctl_domain::command::{CancelOrigin, CommandOutcome};
use loopctl_domain::id::CommandId;

use crate::ports::PumpCommandQueue;

/// Result of asking the executor to issue a command.
#[derive(Debug)]
pub enum Dispatch {
    Issued(PendingCommand),
    /// A command from the same origin has not completed yet.
    AlreadyInFlight,
}

/// Handle to an issued command.
#[derive(Debug)]
pub struct PendingCommand {
    id: CommandId,
    origin: CancelOrigin,
    receiver: oneshot::Receiver<CommandOutcome>,
}

impl PendingCommand {
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    #[must_use]
    pub fn origin(&self) -> CancelOrigin {
        self.origin
    }

    /// Wait for the pump to answer.
    ///
    /// If the command task died before answering, the outcome is a failure.
    pub async fn outcome(self) -> CommandOutcome {
        self.receiver
            .await
            .unwrap_or_else(|_| CommandOutcome::failure("command task ended without a result"))
    }
}

pub struct CommandExecutor<Q> {
    queue: Arc<Q>,
    in_flight: Arc<Mutex<HashSet<CancelOrigin>>>,
}

impl<Q> CommandExecutor<Q>
where
    Q: PumpCommandQueue + Send + Sync + 'static,
{
    pub fn new(queue: Arc<Q>) -> Self {
        Self {
            queue,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Queue a temp basal cancellation on behalf of `origin`.
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(skip(self))]
    pub fn cancel_temp_basal(&self, enforce_new: bool, origin: CancelOrigin) -> Dispatch {
        if !lock(&self.in_flight).insert(origin) {
            tracing::warn!("cancellation already in flight, skipping");
            return Dispatch::AlreadyInFlight;
        }

        let id = CommandId::new();
        let (sender, receiver) = oneshot::channel();
        let queue = Arc::clone(&self.queue);
        let guard = InFlight {
            set: Arc::clone(&self.in_flight),
            origin,
        };

        tokio::spawn(async move {
            let outcome = queue.cancel_temp_basal(enforce_new).await;
            drop(guard);
            tracing::debug!(%id, %origin, ?outcome, "temp basal cancellation completed");
            if sender.send(outcome).is_err() {
                tracing::debug!(%id, "nobody waiting for command outcome");
            }
        });

        tracing::debug!(%id, "temp basal cancellation issued");
        Dispatch::Issued(PendingCommand {
            id,
            origin,
            receiver,
        })
    }

    #[must_use]
    pub fn is_in_flight(&self, origin: CancelOrigin) -> bool {
        lock(&self.in_flight).contains(&origin)
    }
}

/// Marks `origin` as in flight until dropped, including when the pump
/// future panics.
struct InFlight {
    set: Arc<Mutex<HashSet<CancelOrigin>>>,
    origin: CancelOrigin,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.origin);
    }
}

fn lock(set: &Mutex<HashSet<CancelOrigin>>) -> MutexGuard<'_, HashSet<CancelOrigin>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}
