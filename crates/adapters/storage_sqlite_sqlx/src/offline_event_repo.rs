//! `SQLite` implementation of [`OfflineEventStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use uuid::Uuid;

use loopctl_app::ports::OfflineEventStore;
use loopctl_domain::error::LoopError;
use loopctl_domain::id::OfflineEventId;
use loopctl_domain::offline::{OfflineEvent, OfflineReason};

use crate::error::StorageError;

struct Wrapper(OfflineEvent);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: Uuid = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let duration_minutes: u32 = row.try_get("duration_minutes")?;
        let reason: String = row.try_get("reason")?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let reason: OfflineReason = reason
            .parse()
            .map_err(|err: String| sqlx::Error::Decode(err.into()))?;

        Ok(Self(OfflineEvent {
            id: OfflineEventId::from(id),
            created_at,
            duration_minutes,
            reason,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO offline_events (id, created_at, duration_minutes, reason)
    VALUES (?, ?, ?, ?)
";

const SELECT_RECENT: &str =
    "SELECT * FROM offline_events ORDER BY created_at DESC, rowid DESC LIMIT ?";

/// `SQLite`-backed offline-event store.
#[derive(Clone)]
pub struct SqliteOfflineEventStore {
    pool: SqlitePool,
}

impl SqliteOfflineEventStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl OfflineEventStore for SqliteOfflineEventStore {
    async fn record(&self, event: OfflineEvent) -> Result<OfflineEvent, LoopError> {
        sqlx::query(INSERT)
            .bind(Uuid::from(event.id))
            .bind(event.created_at.to_rfc3339())
            .bind(event.duration_minutes)
            .bind(event.reason.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(event)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<OfflineEvent>, LoopError> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use loopctl_domain::time::now;

    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteOfflineEventStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteOfflineEventStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn should_store_and_list_offline_event() {
        let store = setup().await;
        let event = OfflineEvent::new(OfflineReason::LoopDisabled, 1440, now());

        store.record(event.clone()).await.unwrap();

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, event.id);
        assert_eq!(recent[0].reason, OfflineReason::LoopDisabled);
        assert_eq!(recent[0].duration_minutes, 1440);
    }

    #[tokio::test]
    async fn should_list_newest_first_within_limit() {
        let store = setup().await;
        let t0 = now();
        store
            .record(OfflineEvent::new(OfflineReason::LoopDisabled, 1440, t0))
            .await
            .unwrap();
        store
            .record(OfflineEvent::online(
                OfflineReason::LoopEnabled,
                t0 + TimeDelta::minutes(5),
            ))
            .await
            .unwrap();
        store
            .record(OfflineEvent::online(
                OfflineReason::Resumed,
                t0 + TimeDelta::minutes(10),
            ))
            .await
            .unwrap();

        let recent = store.recent(2).await.unwrap();

        let reasons: Vec<_> = recent.iter().map(|e| e.reason).collect();
        assert_eq!(
            reasons,
            vec![OfflineReason::Resumed, OfflineReason::LoopEnabled]
        );
        assert!(recent[0].marks_online());
    }
}
