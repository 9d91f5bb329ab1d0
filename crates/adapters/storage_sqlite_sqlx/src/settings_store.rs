//! `SQLite` implementation of [`SettingsStore`].
//!
//! Values are stored as text; booleans as `true`/`false`. A batch is written
//! inside one transaction.

use sqlx::SqlitePool;

use loopctl_app::ports::{SettingWrite, SettingsStore};
use loopctl_domain::error::LoopError;

use crate::error::StorageError;

const SELECT_VALUE: &str = "SELECT value FROM settings WHERE key = ?";
const UPSERT: &str = r"
    INSERT INTO settings (key, value) VALUES (?, ?)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value
";
const DELETE: &str = "DELETE FROM settings WHERE key = ?";

/// `SQLite`-backed key/value settings.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as(SELECT_VALUE)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn write_batch(&self, batch: Vec<SettingWrite>) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for write in batch {
            match write {
                SettingWrite::String { key, value } => {
                    sqlx::query(UPSERT)
                        .bind(key)
                        .bind(value)
                        .execute(&mut *tx)
                        .await?;
                }
                SettingWrite::Bool { key, value } => {
                    sqlx::query(UPSERT)
                        .bind(key)
                        .bind(value.to_string())
                        .execute(&mut *tx)
                        .await?;
                }
                SettingWrite::Remove { key } => {
                    sqlx::query(DELETE).bind(key).execute(&mut *tx).await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

impl SettingsStore for SqliteSettingsStore {
    async fn get_string(&self, key: &str, default: &str) -> Result<String, LoopError> {
        Ok(self
            .value(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, LoopError> {
        match self.value(key).await?.as_deref() {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(StorageError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }

    async fn write(&self, batch: Vec<SettingWrite>) -> Result<(), LoopError> {
        self.write_batch(batch).await.map_err(LoopError::from)
    }
}
