//! Offline-event store port: audit records of loop downtime.

use std::future::Future;
use std::sync::Arc;

use loopctl_domain::error::LoopError;
use loopctl_domain::offline::OfflineEvent;

/// Persists and lists [`OfflineEvent`]s.
pub trait OfflineEventStore {
    /// Persist a new record.
    fn record(
        &self,
        event: OfflineEvent,
    ) -> impl Future<Output = Result<OfflineEvent, LoopError>> + Send;

    /// The most recent records, newest first.
    fn recent(&self, limit: usize) -> impl Future<Output = Result<Vec<OfflineEvent>, LoopError>> + Send;
}

impl<T: OfflineEventStore + Send + Sync> OfflineEventStore for Arc<T> {
    fn record(
        &self,
        event: OfflineEvent,
    ) -> impl Future<Output = Result<OfflineEvent, LoopError>> + Send {
        (**self).record(event)
    }

    fn recent(&self, limit: usize) -> impl Future<Output = Result<Vec<OfflineEvent>, LoopError>> + Send {
        (**self).recent(limit)
    }
}
