// SQLite-backed counter baselines. One row per counter_id. Every read-modify-write runs
// inside a BEGIN IMMEDIATE transaction so overlapping probe runs against the same state
// file serialize on the SQLite write lock; busy_timeout bounds the wait.

mod row;

use crate::error::{ProbeError, Result};
use crate::models::Baseline;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteSynchronous,
};
use sqlx::{Connection, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub struct CounterStore {
    conn: SqliteConnection,
    lock_timeout: Duration,
}

impl CounterStore {
    /// Opens (creating if missing) the state file at `path`.
    pub async fn open(path: &Path, lock_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ProbeError::Store(format!("create {}: {}", parent.display(), e))
            })?;
        }
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(lock_timeout)
            .synchronous(SqliteSynchronous::Normal);
        let mut conn = SqliteConnection::connect_with(&opts)
            .await
            .map_err(|e| map_sqlx(e, lock_timeout))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counter_state (
                counter_id TEXT PRIMARY KEY,
                in_bytes TEXT NOT NULL,
                out_bytes TEXT NOT NULL,
                observed_at REAL NOT NULL
            )
            "#,
        )
        .execute(&mut conn)
        .await
        .map_err(|e| map_sqlx(e, lock_timeout))?;

        Ok(Self { conn, lock_timeout })
    }

    /// Current baseline for `counter_id`, outside any transaction.
    pub async fn get(&mut self, counter_id: &str) -> Result<Option<Baseline>> {
        self.select(counter_id).await
    }

    /// Unconditionally stores `baseline` for `counter_id`.
    pub async fn put(&mut self, counter_id: &str, baseline: &Baseline) -> Result<()> {
        self.upsert(counter_id, baseline).await
    }

    /// Atomic read-modify-write for one counter.
    ///
    /// Takes the write lock, reads the previous baseline (`None` on first run), and hands it
    /// to `f`. If `f` succeeds, the baseline it returns is written and committed; if it fails,
    /// the transaction is rolled back and the stored row stays as it was.
    #[instrument(skip(self, f), fields(repo = "counter_store", operation = "update"))]
    pub async fn update<T, F>(&mut self, counter_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(Option<Baseline>) -> Result<(T, Baseline)>,
    {
        self.begin().await?;
        let result: Result<T> = async {
            let previous = self.select(counter_id).await?;
            let (value, next) = f(previous)?;
            self.upsert(counter_id, &next).await?;
            Ok(value)
        }
        .await;

        match result {
            Ok(value) => {
                if let Err(e) = self.exec("COMMIT").await {
                    self.rollback().await;
                    return Err(e);
                }
                debug!(counter_id, "baseline committed");
                Ok(value)
            }
            Err(e) => {
                self.rollback().await;
                Err(e)
            }
        }
    }

    /// Deletes the baselines of `counter_ids` in one transaction. Returns rows removed.
    #[instrument(skip(self), fields(repo = "counter_store", operation = "reset"))]
    pub async fn reset(&mut self, counter_ids: &[String]) -> Result<u64> {
        self.begin().await?;
        let mut removed = 0;
        for id in counter_ids {
            match sqlx::query("DELETE FROM counter_state WHERE counter_id = $1")
                .bind(id.as_str())
                .execute(&mut self.conn)
                .await
            {
                Ok(r) => removed += r.rows_affected(),
                Err(e) => {
                    self.rollback().await;
                    return Err(map_sqlx(e, self.lock_timeout));
                }
            }
        }
        if let Err(e) = self.exec("COMMIT").await {
            self.rollback().await;
            return Err(e);
        }
        Ok(removed)
    }

    pub async fn close(self) -> Result<()> {
        let lock_timeout = self.lock_timeout;
        self.conn
            .close()
            .await
            .map_err(|e| map_sqlx(e, lock_timeout))
    }

    async fn begin(&mut self) -> Result<()> {
        self.exec("BEGIN IMMEDIATE").await
    }

    async fn rollback(&mut self) {
        if let Err(e) = sqlx::query("ROLLBACK").execute(&mut self.conn).await {
            // Dropping the connection releases the lock regardless.
            warn!(error = %e, "counter store rollback failed");
        }
    }

    async fn exec(&mut self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| map_sqlx(e, self.lock_timeout))?;
        Ok(())
    }

    async fn select(&mut self, counter_id: &str) -> Result<Option<Baseline>> {
        let row = sqlx::query(
            "SELECT in_bytes, out_bytes, observed_at FROM counter_state WHERE counter_id = $1",
        )
        .bind(counter_id)
        .fetch_optional(&mut self.conn)
        .await
        .map_err(|e| map_sqlx(e, self.lock_timeout))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let in_bytes: String = row.try_get("in_bytes").map_err(|e| corrupt(counter_id, e))?;
        let out_bytes: String = row
            .try_get("out_bytes")
            .map_err(|e| corrupt(counter_id, e))?;
        let observed_at: f64 = row
            .try_get("observed_at")
            .map_err(|e| corrupt(counter_id, e))?;
        row::decode(counter_id, &in_bytes, &out_bytes, observed_at).map(Some)
    }

    async fn upsert(&mut self, counter_id: &str, baseline: &Baseline) -> Result<()> {
        let (in_bytes, out_bytes) = row::encode(baseline);
        sqlx::query(
            "INSERT OR REPLACE INTO counter_state (counter_id, in_bytes, out_bytes, observed_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(counter_id)
        .bind(in_bytes)
        .bind(out_bytes)
        .bind(baseline.observed_at)
        .execute(&mut self.conn)
        .await
        .map_err(|e| map_sqlx(e, self.lock_timeout))?;
        Ok(())
    }
}

fn corrupt(counter_id: &str, e: sqlx::Error) -> ProbeError {
    ProbeError::Store(format!("unreadable entry for {}: {}", counter_id, e))
}

/// SQLITE_BUSY / SQLITE_LOCKED (and their extended codes) mean busy_timeout expired.
fn map_sqlx(e: sqlx::Error, lock_timeout: Duration) -> ProbeError {
    if let sqlx::Error::Database(db) = &e {
        let busy = db
            .code()
            .and_then(|c| c.parse::<i32>().ok())
            .is_some_and(|c| matches!(c & 0xff, 5 | 6))
            || db.message().contains("database is locked");
        if busy {
            return ProbeError::LockTimeout(lock_timeout);
        }
    }
    ProbeError::Store(e.to_string())
}
