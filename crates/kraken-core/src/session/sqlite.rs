//! SQLite-backed session storage (sqlx).

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::memory::cutoff;
use super::token::SessionToken;
use super::{unix_timestamp, DEFAULT_MAX_AGE};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the session database.
///
/// By default the file lives under the XDG state directory:
/// `~/.local/state/kraken/sessions.db`. Rows of a session unused for longer
/// than `max_age` are ignored on read and deleted on the next write.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: Pool<Sqlite>,
    max_age: Duration,
}

impl SqliteSessionStore {
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("kraken")?;
        Ok(xdg_dirs.get_state_home().join("kraken").join("sessions.db"))
    }

    /// Open (or create) the database at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let store = SqliteSessionStore {
            pool,
            max_age: DEFAULT_MAX_AGE,
        };
        store.migrate().await?;
        tracing::debug!(path = %path.display(), "session database ready");
        Ok(store)
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// In-memory database on a single connection (a pool would hand out
    /// distinct empty databases).
    #[cfg(test)]
    async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = SqliteSessionStore {
            pool,
            max_age: DEFAULT_MAX_AGE,
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (token, key)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, token: &SessionToken, key: &str) -> Result<Option<String>> {
        self.get_at(token, key, unix_timestamp()).await
    }

    pub async fn set(&self, token: &SessionToken, key: &str, value: &str) -> Result<()> {
        self.set_at(token, key, value, unix_timestamp()).await
    }

    async fn get_at(&self, token: &SessionToken, key: &str, now: i64) -> Result<Option<String>> {
        let cutoff = cutoff(now, self.max_age);
        let row = sqlx::query(
            r#"
            SELECT value FROM sessions
            WHERE token = ?1 AND key = ?2 AND updated_at >= ?3
            "#,
        )
        .bind(token.as_str())
        .bind(key)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            self.touch(token, now).await?;
        }
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set_at(&self, token: &SessionToken, key: &str, value: &str, now: i64) -> Result<()> {
        let purged = sqlx::query("DELETE FROM sessions WHERE updated_at < ?1")
            .bind(cutoff(now, self.max_age))
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "deleted expired session rows");
        }

        sqlx::query(
            r#"
            INSERT INTO sessions (token, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (token, key) DO UPDATE
            SET value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(token.as_str())
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.touch(token, now).await
    }

    /// Mark every row of the session as used at `now`.
    async fn touch(&self, token: &SessionToken, now: i64) -> Result<()> {
        sqlx::query("UPDATE sessions SET updated_at = ?2 WHERE token = ?1")
            .bind(token.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[cfg(test)]
    async fn row_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }
}
