//! Objective-based constraint evaluator.
//!
//! Modes are unlocked by training milestones recorded in the settings store.
//! Reaching the closed-loop milestone also unlocks low glucose suspend.

use loopctl_domain::constraint::{ConstraintResult, DenialReason, Objective};

use crate::ports::{ConstraintEvaluator, SettingsStore};

pub struct ObjectivesEvaluator<S> {
    settings: S,
    closed_loop_permitted: bool,
}

impl<S> ObjectivesEvaluator<S> {
    pub fn new(settings: S, closed_loop_permitted: bool) -> Self {
        Self {
            settings,
            closed_loop_permitted,
        }
    }
}

impl<S: SettingsStore + Sync> ObjectivesEvaluator<S> {
    async fn reached(&self, objective: Objective) -> Result<bool, DenialReason> {
        self.settings
            .get_bool(objective.settings_key(), false)
            .await
            .map_err(|err| {
                tracing::warn!(?objective, error = %err, "could not read objective progress");
                DenialReason::EligibilityUnavailable
            })
    }
}

impl<S: SettingsStore + Send + Sync> ConstraintEvaluator for ObjectivesEvaluator<S> {
    async fn is_closed_loop_allowed(&self) -> ConstraintResult {
        if !self.closed_loop_permitted {
            return ConstraintResult::Denied(DenialReason::DisabledBySafetyPolicy);
        }
        match self.reached(Objective::ClosedLoop).await {
            Ok(true) => ConstraintResult::Allowed,
            Ok(false) => {
                ConstraintResult::Denied(DenialReason::ObjectiveNotStarted(Objective::ClosedLoop))
            }
            Err(reason) => ConstraintResult::Denied(reason),
        }
    }

    async fn is_low_glucose_suspend_allowed(&self) -> ConstraintResult {
        for objective in [Objective::LowGlucoseSuspend, Objective::ClosedLoop] {
            match self.reached(objective).await {
                Ok(true) => return ConstraintResult::Allowed,
                Ok(false) => {}
                Err(reason) => return ConstraintResult::Denied(reason),
            }
        }
        ConstraintResult::Denied(DenialReason::ObjectiveNotStarted(
            Objective::LowGlucoseSuspend,
        ))
    }
}
