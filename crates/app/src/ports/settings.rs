//! Settings store port: durable key/value preferences.
//!
//! Writes are synchronous from the caller's point of view: once the returned
//! future resolves `Ok`, the values survive a crash.

use std::future::Future;
use std::sync::Arc;

use loopctl_domain::error::LoopError;

/// A single write within an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingWrite {
    String { key: String, value: String },
    Bool { key: String, value: bool },
    Remove { key: String },
}

impl SettingWrite {
    #[must_use]
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::String {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::Bool {
            key: key.into(),
            value,
        }
    }

    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::String { key, .. } | Self::Bool { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// Durable preference storage shared with the rest of the application.
pub trait SettingsStore {
    /// Read a string value, or `default` when the key is absent.
    fn get_string(
        &self,
        key: &str,
        default: &str,
    ) -> impl Future<Output = Result<String, LoopError>> + Send;

    /// Read a boolean value, or `default` when the key is absent.
    fn get_bool(
        &self,
        key: &str,
        default: bool,
    ) -> impl Future<Output = Result<bool, LoopError>> + Send;

    /// Apply every write in `batch` atomically: all or none are durable.
    fn write(&self, batch: Vec<SettingWrite>)
    -> impl Future<Output = Result<(), LoopError>> + Send;

    /// Durably store a string value.
    fn put_string(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), LoopError>> + Send {
        self.write(vec![SettingWrite::string(key, value)])
    }

    /// Durably store a boolean value.
    fn put_bool(&self, key: &str, value: bool) -> impl Future<Output = Result<(), LoopError>> + Send {
        self.write(vec![SettingWrite::bool(key, value)])
    }
}

impl<T: SettingsStore + Send + Sync> SettingsStore for Arc<T> {
    fn get_string(
        &self,
        key: &str,
        default: &str,
    ) -> impl Future<Output = Result<String, LoopError>> + Send {
        (**self).get_string(key, default)
    }

    fn get_bool(
        &self,
        key: &str,
        default: bool,
    ) -> impl Future<Output = Result<bool, LoopError>> + Send {
        (**self).get_bool(key, default)
    }

    fn write(
        &self,
        batch: Vec<SettingWrite>,
    ) -> impl Future<Output = Result<(), LoopError>> + Send {
        (**self).write(batch)
    }
}
