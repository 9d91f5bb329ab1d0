//! Constraint evaluator port: is an automation mode currently permitted?

use std::future::Future;

use loopctl_domain::constraint::ConstraintResult;

/// Answers capability questions about automation modes.
///
/// Implementations must evaluate fresh on every call; callers never cache
/// a result across transitions.
pub trait ConstraintEvaluator {
    fn is_closed_loop_allowed(&self) -> impl Future<Output = ConstraintResult> + Send;

    fn is_low_glucose_suspend_allowed(&self) -> impl Future<Output = ConstraintResult> + Send;
}

impl<T: ConstraintEvaluator + Send + Sync> ConstraintEvaluator for std::sync::Arc<T> {
    fn is_closed_loop_allowed(&self) -> impl Future<Output = ConstraintResult> + Send {
        (**self).is_closed_loop_allowed()
    }

    fn is_low_glucose_suspend_allowed(&self) -> impl Future<Output = ConstraintResult> + Send {
        (**self).is_low_glucose_suspend_allowed()
    }
}
