//! Session state shared between the gateway and its collaborators.
//!
//! The gateway reads the component registry out of the session and
//! reads/writes two pairs of login/logout flags. Sessions are held in an
//! in-memory store keyed by the `netzke_session` cookie; the surrounding
//! application registers components into a session when it renders them.

pub mod flags;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::component::ComponentConfig;

/// Handle to one session's mutable state.
pub type Session = Arc<RwLock<SessionData>>;

/// Per-session state the gateway cares about.
#[derive(Debug, Default)]
pub struct SessionData {
    /// Component registry: component name -> opaque configuration, written
    /// by external code when a component is first rendered.
    pub components: HashMap<String, ComponentConfig>,

    /// Pending marker set by the authentication layer after a login.
    pub next_request_is_first_after_login: bool,
    /// True only for the first request after a login.
    pub just_logged_in: bool,

    /// Pending marker set by the authentication layer after a logout.
    pub next_request_is_first_after_logout: bool,
    /// True only for the first request after a logout.
    pub just_logged_out: bool,

    /// CSRF token, created lazily on first asset request that needs it.
    pub csrf_token: Option<String>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

struct SessionEntry {
    data: Session,
    expires_at: u64,
}

/// In-memory session store with expiration.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
    last_cleanup: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_secs(ttl_seconds),
            last_cleanup: AtomicU64::new(0),
        }
    }

    /// Get a session by ID, refreshing its expiry. Expired sessions are
    /// dropped on access.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let now = now_secs();
        let session = {
            let mut entry = self.sessions.get_mut(session_id)?;
            if entry.expires_at <= now {
                drop(entry);
                self.sessions.remove(session_id);
                debug!(session_id = %session_id, "Dropped expired session");
                return None;
            }
            entry.expires_at = now + self.ttl.as_secs();
            Arc::clone(&entry.data)
        };
        self.maybe_cleanup(now);
        Some(session)
    }

    /// Create a fresh session and return its id and handle.
    pub fn create(&self) -> (String, Session) {
        let session_id = format!("sess_{}", uuid::Uuid::new_v4());
        let data: Session = Arc::new(RwLock::new(SessionData::default()));
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                data: Arc::clone(&data),
                expires_at: now_secs() + self.ttl.as_secs(),
            },
        );
        info!(session_id = %session_id, "Created session");
        (session_id, data)
    }

    /// Insert a session under a known id (used by external wiring that
    /// already owns the session id).
    pub fn insert(&self, session_id: &str, data: Session) {
        self.sessions.insert(
            session_id.to_string(),
            SessionEntry {
                data,
                expires_at: now_secs() + self.ttl.as_secs(),
            },
        );
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sweep expired sessions at most once per minute.
    fn maybe_cleanup(&self, now: u64) {
        let last = self.last_cleanup.load(Ordering::Relaxed);
        if now.saturating_sub(last) < 60 {
            return;
        }
        if self
            .last_cleanup
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "Swept expired sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(3600);
        let (id, session) = store.create();
        session
            .write()
            .unwrap()
            .components
            .insert("grid".into(), ComponentConfig(serde_json::json!({})));

        let fetched = store.get(&id).unwrap();
        assert!(fetched.read().unwrap().components.contains_key("grid"));
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = SessionStore::new(3600);
        assert!(store.get("sess_missing").is_none());
    }

    #[test]
    fn test_expired_session_dropped_on_access() {
        let store = SessionStore::new(0);
        let (id, _session) = store.create();
        assert!(store.get(&id).is_none());
        assert_eq!(store.session_count(), 0);
    }
}
