use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::user_session::{UserSession, WorkflowState};

pub type SessionHandle = Arc<Mutex<UserSession>>;

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    handle: SessionHandle,
    last_active: DateTime<Utc>,
}

/// Registry of live sessions. Each session sits behind its own lock so work on
/// one session never waits on another. Sessions left idle longer than the
/// TTL are evicted.
#[derive(Clone)]
pub struct GlobalSessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    history_max_turns: Option<usize>,
    idle_ttl: Duration,
}

impl Default for GlobalSessionManager {
    fn default() -> Self {
        GlobalSessionManager::new(None, DEFAULT_IDLE_TTL)
    }
}

impl GlobalSessionManager {
    pub fn new(history_max_turns: Option<usize>, idle_ttl: Duration) -> Self {
        GlobalSessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            history_max_turns,
            idle_ttl,
        }
    }

    /// Creates a fresh session and returns its id with a handle to it.
    /// Idle sessions are swept first.
    pub async fn create(&self) -> (String, SessionHandle) {
        let now = Utc::now();
        let session_id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(UserSession::new(self.history_max_turns)));

        let mut sessions = self.sessions.write().await;
        let evicted = evict_expired(&mut sessions, now, self.idle_ttl);
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        sessions.insert(
            session_id.clone(),
            SessionEntry { handle: handle.clone(), last_active: now },
        );
        (session_id, handle)
    }

    /// Retrieves a session if it exists and marks it as active.
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(|entry| {
            entry.last_active = Utc::now();
            entry.handle.clone()
        })
    }

    /// Drops a session and everything it holds.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now()).await
    }

    /// Removes every session idle for longer than the TTL as of `now`.
    /// Sessions with a generation in flight are kept.
    pub async fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions, now, self.idle_ttl)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn evict_expired(
    sessions: &mut HashMap<String, SessionEntry>,
    now: DateTime<Utc>,
    idle_ttl: Duration,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| {
        let expired = now
            .signed_duration_since(entry.last_active)
            .to_std()
            .map(|idle| idle > idle_ttl)
            .unwrap_or(false);
        if !expired {
            return true;
        }
        // a locked session is in use right now
        match entry.handle.try_lock() {
            Ok(session) => session.workflow == WorkflowState::Generating,
            Err(_) => true,
        }
    });
    before - sessions.len()
}
