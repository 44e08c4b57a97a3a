//! Server-side sessions keyed by a signed, client-held token.
//!
//! The client only ever sees `<token>.<signature>` in a cookie; values live
//! in a [`SessionStore`]. A request without a valid cookie has no session
//! until a controller writes to it, at which point a fresh token is issued.

mod memory;
mod sqlite;
mod token;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;
pub use token::{SessionToken, TokenError, TokenSigner};

use crate::config::{SessionBackend, SessionConfig};
use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Body returned by the session controller when nothing was stored.
pub const NO_VALUE: &str = "(no value)";

/// Idle lifetime of a session when none is configured.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Backend holding session values.
#[derive(Debug, Clone)]
pub enum SessionStore {
    Memory(MemorySessionStore),
    Sqlite(SqliteSessionStore),
}

impl SessionStore {
    pub async fn open(cfg: &SessionConfig) -> Result<Self> {
        match cfg.backend {
            SessionBackend::Memory => Ok(SessionStore::Memory(MemorySessionStore::with_max_age(
                cfg.max_age(),
            ))),
            SessionBackend::Sqlite => {
                let path = match &cfg.sqlite_path {
                    Some(p) => p.clone(),
                    None => SqliteSessionStore::default_path()?,
                };
                let store = SqliteSessionStore::open_at(&path).await?;
                Ok(SessionStore::Sqlite(store.with_max_age(cfg.max_age())))
            }
        }
    }

    pub async fn get(&self, token: &SessionToken, key: &str) -> Result<Option<String>> {
        match self {
            SessionStore::Memory(m) => Ok(m.get(token, key)),
            SessionStore::Sqlite(s) => s.get(token, key).await,
        }
    }

    pub async fn set(&self, token: &SessionToken, key: &str, value: &str) -> Result<()> {
        match self {
            SessionStore::Memory(m) => {
                m.set(token, key, value);
                Ok(())
            }
            SessionStore::Sqlite(s) => s.set(token, key, value).await,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<SessionToken>,
    issued: bool,
}

/// The current request's session. Clones share state, so the server can
/// see a token issued while a controller ran.
#[derive(Debug, Clone)]
pub struct Session {
    store: SessionStore,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    /// Session for a request that presented `token` (or none).
    pub fn new(store: SessionStore, token: Option<SessionToken>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(SessionState {
                token,
                issued: false,
            })),
        }
    }

    fn current_token(&self) -> Option<SessionToken> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.current_token() {
            Some(token) => self.store.get(&token, key).await,
            None => Ok(None),
        }
    }

    /// Store `value`, issuing a new token if the request had none.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let token = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &state.token {
                Some(token) => token.clone(),
                None => {
                    let token = SessionToken::generate();
                    tracing::debug!("issuing new session token");
                    state.token = Some(token.clone());
                    state.issued = true;
                    token
                }
            }
        };
        self.store.set(&token, key, value).await
    }

    /// Token created during this request; the response must carry it.
    pub fn issued_token(&self) -> Option<SessionToken> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.issued {
            state.token.clone()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_session_reads_nothing_and_issues_nothing() {
        let session = Session::new(SessionStore::Memory(MemorySessionStore::new()), None);
        assert_eq!(session.get("value").await.unwrap(), None);
        assert!(session.issued_token().is_none());
    }

    #[tokio::test]
    async fn first_write_issues_token_visible_to_clones() {
        let store = MemorySessionStore::new();
        let session = Session::new(SessionStore::Memory(store.clone()), None);
        let observer = session.clone();

        session.set("value", "blah").await.unwrap();
        let token = observer.issued_token().expect("token issued");
        assert_eq!(store.get(&token, "value").as_deref(), Some("blah"));
        assert_eq!(observer.get("value").await.unwrap().as_deref(), Some("blah"));
    }

    #[tokio::test]
    async fn existing_token_is_reused() {
        let store = MemorySessionStore::new();
        let token = SessionToken::generate();
        store.set(&token, "value", "old");

        let session = Session::new(SessionStore::Memory(store.clone()), Some(token.clone()));
        assert_eq!(session.get("value").await.unwrap().as_deref(), Some("old"));
        session.set("value", "new").await.unwrap();
        assert!(session.issued_token().is_none());
        assert_eq!(store.get(&token, "value").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn open_selects_backend() {
        let dir = tempfile::tempdir().unwrap();
        let memory = SessionStore::open(&SessionConfig::default()).await.unwrap();
        assert!(matches!(memory, SessionStore::Memory(_)));

        let cfg = SessionConfig {
            backend: SessionBackend::Sqlite,
            sqlite_path: Some(dir.path().join("sessions.db")),
            max_age_secs: 3600,
        };
        let sqlite = SessionStore::open(&cfg).await.unwrap();
        assert!(matches!(sqlite, SessionStore::Sqlite(_)));

        let token = SessionToken::generate();
        sqlite.set(&token, "value", "x").await.unwrap();
        assert_eq!(sqlite.get(&token, "value").await.unwrap().as_deref(), Some("x"));
    }
}
