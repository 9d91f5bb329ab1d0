//! Dosing-profile provider port.

use std::future::Future;

use loopctl_domain::profile::Profile;

/// Access to the dosing profile owned by the dosing algorithm.
pub trait ProfileProvider {
    /// The active profile, if one is set.
    fn get_profile(&self) -> impl Future<Output = Option<Profile>> + Send;

    /// Whether the active profile is usable right now. `context` names the
    /// caller for the provider's own diagnostics.
    fn is_profile_valid(&self, context: &str) -> impl Future<Output = bool> + Send;
}

impl<T: ProfileProvider + Send + Sync> ProfileProvider for std::sync::Arc<T> {
    fn get_profile(&self) -> impl Future<Output = Option<Profile>> + Send {
        (**self).get_profile()
    }

    fn is_profile_valid(&self, context: &str) -> impl Future<Output = bool> + Send {
        (**self).is_profile_valid(context)
    }
}
