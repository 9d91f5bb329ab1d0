//! Confirmer port: asks the user to confirm an action.

use std::future::Future;

/// Presents `description` to the user and resolves with their answer.
pub trait Confirmer {
    fn confirm(&self, description: &str) -> impl Future<Output = bool> + Send;
}

/// A confirmer whose answer is already known, e.g. carried in a request.
#[derive(Debug, Clone, Copy)]
pub struct PresetAnswer(pub bool);

impl Confirmer for PresetAnswer {
    async fn confirm(&self, _description: &str) -> bool {
        self.0
    }
}
