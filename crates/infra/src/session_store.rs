//! Server-side session storage.
//!
//! A session is keyed by its [`SessionId`] (the cookie value) and holds only
//! a [`SessionState`]: account key, sign-up flag and pending error.
//! Sessions expire after an idle timeout; every `load` counts as activity.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use fedgate_auth::SessionState;
use fedgate_core::SessionId;

/// Session storage abstraction.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: SessionId) -> Option<SessionState>;
    fn save(&self, id: SessionId, state: SessionState);
    fn destroy(&self, id: SessionId);

    /// How long an untouched session survives. Also the cookie lifetime.
    fn idle_timeout(&self) -> Duration;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn load(&self, id: SessionId) -> Option<SessionState> {
        (**self).load(id)
    }

    fn save(&self, id: SessionId, state: SessionState) {
        (**self).save(id, state)
    }

    fn destroy(&self, id: SessionId) {
        (**self).destroy(id)
    }

    fn idle_timeout(&self) -> Duration {
        (**self).idle_timeout()
    }
}

/// Default idle timeout: one day.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct Entry {
    state: SessionState,
    last_seen: Instant,
}

/// In-memory session store for tests/dev.
///
/// Expired sessions are swept on every `save`, so the map never holds more
/// than the sessions active within one idle timeout.
#[derive(Debug)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, Entry>>,
    idle_timeout: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.idle_timeout
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, id: SessionId) -> Option<SessionState> {
        let mut map = self.inner.write().ok()?;
        let now = Instant::now();

        if self.is_expired(map.get(&id)?, now) {
            map.remove(&id);
            return None;
        }

        let entry = map.get_mut(&id)?;
        entry.last_seen = now;
        Some(entry.state.clone())
    }

    fn save(&self, id: SessionId, state: SessionState) {
        if let Ok(mut map) = self.inner.write() {
            let now = Instant::now();
            map.retain(|_, entry| !self.is_expired(entry, now));
            map.insert(
                id,
                Entry {
                    state,
                    last_seen: now,
                },
            );
        }
    }

    fn destroy(&self, id: SessionId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&id);
        }
    }

    fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}
