//! Loop state store: the in-memory loop state and its durable copy.
//!
//! Every mutation goes through a [`StateTransaction`]: changes are made on a
//! draft, written to the settings store, and only then become the in-memory
//! state. A transaction dropped without a successful commit leaves both
//! copies untouched. Holding a transaction also serialises transitions, so
//! no two transitions ever evaluate the same snapshot.

use chrono::DateTime;
use tokio::sync::{Mutex, MutexGuard};

use loopctl_domain::error::LoopError;
use loopctl_domain::loop_state::LoopState;
use loopctl_domain::mode::AutomationMode;
use loopctl_domain::time::Timestamp;

use crate::ports::{Clock, SettingWrite, SettingsStore};

/// Keys the loop state occupies in the settings store.
pub mod keys {
    pub const APS_MODE: &str = "aps_mode";
    pub const LOOP_ENABLED: &str = "loop_enabled";
    pub const SUSPENDED_UNTIL: &str = "loop_suspended_until";
    pub const DISCONNECTED_UNTIL: &str = "loop_disconnected_until";
    /// Set once the user has resumed or reconnected from the loop menu.
    pub const USED_RECONNECT: &str = "objective_use_reconnect";
    /// Set once the user has disconnected the pump for one hour.
    pub const USED_DISCONNECT: &str = "objective_use_disconnect";
}

/// Owner of the loop state.
pub struct LoopStateStore<S, K> {
    settings: S,
    clock: K,
    state: Mutex<LoopState>,
}

impl<S, K> LoopStateStore<S, K>
where
    S: SettingsStore + Send + Sync,
    K: Clock,
{
    /// Load the last persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] when the settings store cannot be read.
    pub async fn load(settings: S, clock: K) -> Result<Self, LoopError> {
        let state = read_state(&settings).await?;
        tracing::info!(
            enabled = state.enabled,
            mode = %state.mode,
            "loop state loaded"
        );
        Ok(Self {
            settings,
            clock,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[must_use]
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> LoopState {
        self.state.lock().await.clone()
    }

    /// Start a transaction, waiting for any in-progress one to finish.
    pub async fn begin(&self) -> StateTransaction<'_, S> {
        let guard = self.state.lock().await;
        let draft = guard.clone();
        StateTransaction {
            guard,
            draft,
            settings: &self.settings,
        }
    }

    /// Replace the in-memory state with what is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] when the settings store cannot be read.
    pub async fn reload(&self) -> Result<LoopState, LoopError> {
        let mut guard = self.state.lock().await;
        let fresh = read_state(&self.settings).await?;
        *guard = fresh.clone();
        Ok(fresh)
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.is_enabled()
    }

    pub async fn is_suspended(&self) -> bool {
        let now = self.now();
        self.state.lock().await.is_suspended(now)
    }

    pub async fn is_disconnected(&self) -> bool {
        let now = self.now();
        self.state.lock().await.is_disconnected(now)
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] if the change could not be persisted;
    /// the state is then unchanged.
    pub async fn set_enabled(&self, enabled: bool) -> Result<LoopState, LoopError> {
        self.mutate(|state| {
            state.set_enabled(enabled);
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] if the change could not be persisted.
    pub async fn set_mode(&self, mode: AutomationMode) -> Result<LoopState, LoopError> {
        self.mutate(|state| {
            state.set_mode(mode);
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Validation`] for a zero duration, or
    /// [`LoopError::Storage`] if the change could not be persisted.
    pub async fn suspend_for(&self, minutes: u32) -> Result<LoopState, LoopError> {
        let now = self.now();
        self.mutate(|state| Ok(state.suspend_for(minutes, now)?))
            .await
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Validation`] for a zero duration, or
    /// [`LoopError::Storage`] if the change could not be persisted.
    pub async fn disconnect_for(&self, minutes: u32) -> Result<LoopState, LoopError> {
        let now = self.now();
        self.mutate(|state| Ok(state.disconnect_for(minutes, now)?))
            .await
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] if the change could not be persisted.
    pub async fn clear_suspend(&self) -> Result<LoopState, LoopError> {
        self.mutate(|state| {
            state.clear_suspend();
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] if the change could not be persisted.
    pub async fn clear_disconnect(&self) -> Result<LoopState, LoopError> {
        self.mutate(|state| {
            state.clear_disconnect();
            Ok(())
        })
        .await
    }

    async fn mutate(
        &self,
        change: impl FnOnce(&mut LoopState) -> Result<(), LoopError>,
    ) -> Result<LoopState, LoopError> {
        let mut tx = self.begin().await;
        change(tx.draft_mut())?;
        tx.commit().await?;
        Ok(tx.current().clone())
    }
}

/// Exclusive, write-through access to the loop state.
pub struct StateTransaction<'a, S> {
    guard: MutexGuard<'a, LoopState>,
    draft: LoopState,
    settings: &'a S,
}

impl<S: SettingsStore + Sync> StateTransaction<'_, S> {
    /// The last committed state.
    #[must_use]
    pub fn current(&self) -> &LoopState {
        &self.guard
    }

    #[must_use]
    pub fn draft(&self) -> &LoopState {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut LoopState {
        &mut self.draft
    }

    /// Persist the draft, then make it the current state.
    ///
    /// Returns `false` without touching storage when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] when the write fails; the current
    /// state is then left as it was.
    pub async fn commit(&mut self) -> Result<bool, LoopError> {
        self.commit_with(Vec::new()).await
    }

    /// Like [`commit`](Self::commit), writing `extra` settings in the same
    /// atomic batch. `extra` is written even if the loop state is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Storage`] when the write fails.
    pub async fn commit_with(&mut self, extra: Vec<SettingWrite>) -> Result<bool, LoopError> {
        let changed = self.draft != *self.guard;
        if !changed && extra.is_empty() {
            return Ok(false);
        }

        let mut batch = if changed {
            state_writes(&self.draft)
        } else {
            Vec::new()
        };
        batch.extend(extra);

        if let Err(err) = self.settings.write(batch).await {
            tracing::error!(error = %err, "failed to persist loop state");
            self.draft = self.guard.clone();
            return Err(err);
        }

        *self.guard = self.draft.clone();
        tracing::debug!(state = ?*self.guard, "loop state persisted");
        Ok(changed)
    }
}

fn state_writes(state: &LoopState) -> Vec<SettingWrite> {
    vec![
        SettingWrite::bool(keys::LOOP_ENABLED, state.enabled),
        SettingWrite::string(keys::APS_MODE, state.mode.as_key()),
        timestamp_write(keys::SUSPENDED_UNTIL, state.suspended_until),
        timestamp_write(keys::DISCONNECTED_UNTIL, state.disconnected_until),
    ]
}

fn timestamp_write(key: &str, value: Option<Timestamp>) -> SettingWrite {
    match value {
        Some(ts) => SettingWrite::string(key, ts.to_rfc3339()),
        None => SettingWrite::remove(key),
    }
}

async fn read_state<S: SettingsStore + Sync>(settings: &S) -> Result<LoopState, LoopError> {
    let defaults = LoopState::default();

    let enabled = settings
        .get_bool(keys::LOOP_ENABLED, defaults.enabled)
        .await?;

    let raw_mode = settings
        .get_string(keys::APS_MODE, defaults.mode.as_key())
        .await?;
    let mode = raw_mode.parse().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to open loop");
        AutomationMode::Open
    });

    let suspended_until = read_timestamp(settings, keys::SUSPENDED_UNTIL).await?;
    let disconnected_until = read_timestamp(settings, keys::DISCONNECTED_UNTIL).await?;

    Ok(LoopState {
        enabled,
        mode,
        suspended_until,
        disconnected_until,
    })
}

async fn read_timestamp<S: SettingsStore + Sync>(
    settings: &S,
    key: &str,
) -> Result<Option<Timestamp>, LoopError> {
    let raw = settings.get_string(key, "").await?;
    if raw.is_empty() {
        return Ok(None);
    }
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(ts) => Ok(Some(ts.to_utc())),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring unreadable timestamp");
            Ok(None)
        }
    }
}
