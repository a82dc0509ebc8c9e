//! Embedded in-memory coordination backend.
//!
//! Enforces the same contract as the real backend: check-and-set acquire,
//! session-bound key lifetime, lazy TTL expiry on unix timestamps. Useful as
//! a deterministic stand-in for tests and single-process setups.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::backend::{CoordinationBackend, LockRecord, ServiceDescriptor, SessionRequest};
use crate::error::{ElectionError, Result};
use crate::session::parse_ttl;

/// Session behavior that deletes affiliated keys on expiry.
const BEHAVIOR_DELETE: &str = "delete";

#[derive(Clone)]
struct StoredSession {
    behavior: String,
    /// Millisecond granularity so sub-second TTLs do not truncate to zero.
    ttl_ms: u64,
    last_renewed_ms: u64,
}

impl StoredSession {
    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_renewed_ms) > self.ttl_ms
    }
}

#[derive(Clone)]
struct StoredKv {
    value: Vec<u8>,
    session: Option<String>,
}

/// In-memory KV + session store implementing [`CoordinationBackend`].
#[derive(Default)]
pub struct MemoryBackend {
    sessions: DashMap<String, StoredSession>,
    kv: DashMap<String, StoredKv>,
    services: DashMap<String, ServiceDescriptor>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a session to expire immediately, applying its expiry behavior.
    /// Deterministic replacement for waiting out a TTL in tests.
    pub fn expire_session(&self, session_id: &str) {
        if let Some((id, stored)) = self.sessions.remove(session_id) {
            self.apply_expiry(&id, &stored.behavior);
        }
    }

    /// True while the session exists and its TTL clock has not lapsed.
    pub fn session_is_live(&self, session_id: &str) -> bool {
        self.reap_if_expired(session_id);
        self.sessions.contains_key(session_id)
    }

    /// Descriptor registered under `id`, if any.
    pub fn registered_service(&self, id: &str) -> Option<ServiceDescriptor> {
        self.services.get(id).map(|d| d.clone())
    }

    /// Lazily expire a session whose TTL has lapsed.
    fn reap_if_expired(&self, session_id: &str) {
        let expired = self
            .sessions
            .get(session_id)
            .map(|s| s.is_expired(current_unix_millis()))
            .unwrap_or(false);

        if expired {
            debug!(session_id = %session_id, "reaping expired session");
            self.expire_session(session_id);
        }
    }

    /// Apply a dead session's expiry behavior to every key bound to it.
    fn apply_expiry(&self, session_id: &str, behavior: &str) {
        if behavior == BEHAVIOR_DELETE {
            self.kv
                .retain(|_, stored| stored.session.as_deref() != Some(session_id));
        } else {
            for mut entry in self.kv.iter_mut() {
                if entry.session.as_deref() == Some(session_id) {
                    entry.session = None;
                }
            }
        }
    }
}

#[async_trait]
impl CoordinationBackend for MemoryBackend {
    async fn create_session(&self, req: SessionRequest) -> Result<String> {
        let ttl = parse_ttl(&req.ttl)?;
        let session_id = uuid::Uuid::new_v4().to_string();

        self.sessions.insert(
            session_id.clone(),
            StoredSession {
                behavior: req.behavior,
                ttl_ms: ttl.as_millis() as u64,
                last_renewed_ms: current_unix_millis(),
            },
        );

        debug!(session_id = %session_id, ttl = %req.ttl, "created in-memory session");
        Ok(session_id)
    }

    async fn renew_session(&self, session_id: &str) -> Result<()> {
        self.reap_if_expired(session_id);

        match self.sessions.get_mut(session_id) {
            Some(mut stored) => {
                stored.last_renewed_ms = current_unix_millis();
                Ok(())
            }
            None => Err(ElectionError::SessionNotFound(session_id.to_string())),
        }
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        self.reap_if_expired(session_id);

        match self.sessions.remove(session_id) {
            Some((id, stored)) => {
                self.apply_expiry(&id, &stored.behavior);
                Ok(())
            }
            None => Err(ElectionError::SessionNotFound(session_id.to_string())),
        }
    }

    async fn acquire(&self, key: &str, value: &[u8], session_id: &str) -> Result<bool> {
        if !self.session_is_live(session_id) {
            return Err(ElectionError::SessionNotFound(session_id.to_string()));
        }

        // Reap a dead holder first so its binding does not block the acquire.
        if let Some(holder) = self
            .kv
            .get(key)
            .and_then(|stored| stored.session.clone())
        {
            self.reap_if_expired(&holder);
        }

        // Check-and-set: free, or already ours.
        if let Some(existing) = self.kv.get(key) {
            if let Some(holder) = existing.session.as_deref() {
                if holder != session_id {
                    return Ok(false);
                }
            }
        }

        self.kv.insert(
            key.to_string(),
            StoredKv {
                value: value.to_vec(),
                session: Some(session_id.to_string()),
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<LockRecord>> {
        if let Some(holder) = self
            .kv
            .get(key)
            .and_then(|stored| stored.session.clone())
        {
            self.reap_if_expired(&holder);
        }

        Ok(self.kv.get(key).map(|stored| LockRecord {
            value: stored.value.clone(),
            session: stored.session.clone(),
        }))
    }

    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        self.services
            .insert(descriptor.id.clone(), descriptor.clone());
        Ok(())
    }
}

fn current_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
