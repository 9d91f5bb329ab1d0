//! Pool construction and schema migrations.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StorageError;

/// Where the loop database lives.
pub struct Config {
    /// For example `sqlite:loopctl.db` or `sqlite::memory:`.
    pub database_url: String,
}

impl Config {
    /// Each connection to `:memory:` would see its own empty database, so
    /// such URLs get a single shared connection.
    fn max_connections(&self) -> u32 {
        if self.database_url.contains(":memory:") {
            1
        } else {
            4
        }
    }

    /// Open the pool (creating the file if needed) and bring the schema
    /// up to date.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError`] when the URL is invalid, the database
    /// cannot be opened or a migration does not apply.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections())
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(url = %self.database_url, "loop database ready");

        Ok(Database { pool })
    }
}

/// A migrated connection pool.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_create_pool_and_run_migrations_when_using_memory_db() {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
        };
        let db = config.build().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["offline_events", "settings"]);
    }

    #[test]
    fn should_share_single_connection_when_database_is_in_memory() {
        let memory = Config {
            database_url: "sqlite::memory:".to_string(),
        };
        let file = Config {
            database_url: "sqlite:loopctl.db".to_string(),
        };
        assert_eq!(memory.max_connections(), 1);
        assert_eq!(file.max_connections(), 4);
    }
}
