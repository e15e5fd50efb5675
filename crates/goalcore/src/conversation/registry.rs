use std::time::Duration;

use dashmap::DashMap;

use crate::conversation::session::{Session, Stage};
use crate::core::{config, metrics};

/// Open goal-creation sessions keyed by the sender's Telegram user id.
///
/// Lookups hand out clones; a changed session is only visible after `put`.
/// No map guard outlives a single call.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<i64, Session>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Registry using `SESSION_IDLE_TIMEOUT_SECS`.
    pub fn from_config() -> Self {
        Self::new(config::session::idle_timeout())
    }

    /// Returns the sender's session, discarding it first if it went stale.
    pub fn get(&self, sender_id: i64) -> Option<Session> {
        let session = self.sessions.get(&sender_id).map(|entry| entry.value().clone())?;

        if let Some(timeout) = self.idle_timeout {
            if session.is_expired(timeout) {
                log::info!(
                    "Discarding goal session of {} idle for more than {}s at {:?}",
                    sender_id,
                    timeout.as_secs(),
                    session.stage()
                );
                self.remove(sender_id);
                return None;
            }
        }
        Some(session)
    }

    pub fn stage(&self, sender_id: i64) -> Stage {
        self.get(sender_id).map_or(Stage::Idle, |s| s.stage())
    }

    /// Stores the session, replacing any previous one of the sender.
    pub fn put(&self, sender_id: i64, session: Session) {
        self.sessions.insert(sender_id, session);
        metrics::ACTIVE_SESSIONS.set(self.sessions.len() as i64);
    }

    pub fn remove(&self, sender_id: i64) -> Option<Session> {
        let removed = self.sessions.remove(&sender_id).map(|(_, session)| session);
        metrics::ACTIVE_SESSIONS.set(self.sessions.len() as i64);
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
