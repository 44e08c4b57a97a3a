//! Process-local session storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::token::SessionToken;
use super::{unix_timestamp, DEFAULT_MAX_AGE};

#[derive(Debug)]
struct Entry {
    values: HashMap<String, String>,
    /// Unix seconds of the last read or write.
    last_used: i64,
}

#[derive(Debug)]
struct Inner {
    sessions: HashMap<String, Entry>,
    max_age: Duration,
}

/// Sessions kept in memory; cloned handles share the same map.
///
/// A session unused for longer than `max_age` reads as empty and is
/// dropped on the next write.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
                max_age,
            })),
        }
    }

    pub fn get(&self, token: &SessionToken, key: &str) -> Option<String> {
        self.get_at(token, key, unix_timestamp())
    }

    pub fn set(&self, token: &SessionToken, key: &str, value: &str) {
        self.set_at(token, key, value, unix_timestamp());
    }

    fn get_at(&self, token: &SessionToken, key: &str, now: i64) -> Option<String> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cutoff = cutoff(now, inner.max_age);
        let entry = inner.sessions.get_mut(token.as_str())?;
        if entry.last_used < cutoff {
            return None;
        }
        entry.last_used = now;
        entry.values.get(key).cloned()
    }

    /// `set` as if the current time were `now` (unix seconds).
    pub(crate) fn set_at(&self, token: &SessionToken, key: &str, value: &str, now: i64) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cutoff = cutoff(now, inner.max_age);
        let before = inner.sessions.len();
        inner.sessions.retain(|_, e| e.last_used >= cutoff);
        let dropped = before - inner.sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "expired in-memory sessions");
        }
        let entry = inner
            .sessions
            .entry(token.as_str().to_string())
            .or_insert_with(|| Entry {
                values: HashMap::new(),
                last_used: now,
            });
        entry.last_used = now;
        entry.values.insert(key.to_string(), value.to_string());
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .len()
    }
}

/// Oldest `last_used` still considered live at `now`.
pub(super) fn cutoff(now: i64, max_age: Duration) -> i64 {
    now.saturating_sub(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX))
}
