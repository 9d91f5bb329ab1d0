//! Confirmation gateway: asks before a safety-relevant action runs.

use std::future::Future;

use loopctl_domain::action::LoopAction;
use loopctl_domain::error::LoopError;

use crate::ports::control::Transition;
use crate::ports::{Confirmer, LoopControl};

/// Outcome of a confirmed action.
#[derive(Debug)]
pub enum Confirmation<T> {
    Confirmed(T),
    /// The user declined; the action was not invoked.
    Declined,
}

/// Runs actions only once the user has confirmed them.
///
/// With confirmation not required, actions run immediately.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGateway {
    required: bool,
}

impl Default for ConfirmationGateway {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConfirmationGateway {
    #[must_use]
    pub fn new(required: bool) -> Self {
        Self { required }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Ask `confirmer` about `description` and run `on_confirmed` on acceptance.
    pub async fn confirm<C, F, Fut>(
        &self,
        confirmer: &C,
        description: &str,
        on_confirmed: F,
    ) -> Confirmation<Fut::Output>
    where
        C: Confirmer + Sync,
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if self.required && !confirmer.confirm(description).await {
            tracing::info!(description, "action declined");
            return Confirmation::Declined;
        }
        Confirmation::Confirmed(on_confirmed().await)
    }

    /// Confirm `action` using its description, then apply it.
    ///
    /// # Errors
    ///
    /// Returns whatever [`LoopControl::apply`] returns once confirmed.
    pub async fn request<L, C>(
        &self,
        control: &L,
        confirmer: &C,
        action: LoopAction,
    ) -> Result<Confirmation<Transition>, LoopError>
    where
        L: LoopControl + Sync,
        C: Confirmer + Sync,
    {
        let description = action.description();
        match self
            .confirm(confirmer, &description, || control.apply(action))
            .await
        {
            Confirmation::Confirmed(result) => result.map(Confirmation::Confirmed),
            Confirmation::Declined => Ok(Confirmation::Declined),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ports::confirm::PresetAnswer;

    #[derive(Default)]
    struct RecordingConfirmer {
        asked: Mutex<Vec<String>>,
    }

    impl Confirmer for RecordingConfirmer {
        async fn confirm(&self, description: &str) -> bool {
            self.asked.lock().unwrap().push(description.to_string());
            true
        }
    }

    #[tokio::test]
    async fn should_not_invoke_action_when_declined() {
        let invoked = AtomicUsize::new(0);
        let gateway = ConfirmationGateway::new(true);

        let result = gateway
            .confirm(&PresetAnswer(false), "Disable loop", || async {
                invoked.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert!(matches!(result, Confirmation::Declined));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_invoke_action_exactly_once_when_accepted() {
        let invoked = AtomicUsize::new(0);
        let gateway = ConfirmationGateway::new(true);

        let result = gateway
            .confirm(&PresetAnswer(true), "Enable loop", || async {
                invoked.fetch_add(1, Ordering::SeqCst)
            })
            .await;

        assert!(matches!(result, Confirmation::Confirmed(0)));
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_skip_prompt_when_not_required() {
        let confirmer = RecordingConfirmer::default();
        let gateway = ConfirmationGateway::new(false);

        let result = gateway.confirm(&confirmer, "Resume", || async { 7 }).await;

        assert!(matches!(result, Confirmation::Confirmed(7)));
        assert!(confirmer.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_present_action_description() {
        let confirmer = RecordingConfirmer::default();
        let gateway = ConfirmationGateway::default();

        let action = LoopAction::Suspend {
            duration: loopctl_domain::action::SuspendDuration::TwoHours,
        };
        let description = action.description();
        gateway.confirm(&confirmer, &description, || async {}).await;

        assert_eq!(*confirmer.asked.lock().unwrap(), vec![description]);
    }
}
