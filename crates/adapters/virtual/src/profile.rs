use loopctl_app::ports::ProfileProvider;
use loopctl_domain::profile::Profile;

/// Profile provider with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileProvider {
    profile: Option<Profile>,
}

impl StaticProfileProvider {
    #[must_use]
    pub fn new(profile: Option<Profile>) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Some(Profile::new(name)))
    }
}

impl ProfileProvider for StaticProfileProvider {
    async fn get_profile(&self) -> Option<Profile> {
        self.profile.clone()
    }

    async fn is_profile_valid(&self, context: &str) -> bool {
        let valid = self.profile.is_some();
        if !valid {
            tracing::debug!(context, "no profile configured");
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_report_named_profile_as_valid() {
        let provider = StaticProfileProvider::named("Default");

        assert_eq!(provider.get_profile().await, Some(Profile::new("Default")));
        assert!(provider.is_profile_valid("test").await);
    }

    #[tokio::test]
    async fn should_report_missing_profile_as_invalid() {
        let provider = StaticProfileProvider::default();

        assert!(provider.get_profile().await.is_none());
        assert!(!provider.is_profile_valid("test").await);
    }
}
