//! Session lifecycle: create, periodic renew, destroy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{CoordinationBackend, SessionRequest};
use crate::error::{ElectionError, Result};
use crate::signal::DoneSignal;

/// Expiry behavior for every session this manager creates: affiliated keys
/// are deleted when the lease lapses, which is what makes a crashed holder's
/// lock self-healing.
pub const SESSION_BEHAVIOR: &str = "delete";

/// Minimal lock-delay so a freed key becomes re-acquirable immediately
/// instead of sitting out a grace period.
pub const SESSION_LOCK_DELAY: &str = "1ms";

/// Owns the local view of one lease.
///
/// The session id handed out by [`SessionManager::create`] is read-only after
/// creation; the renewal loop and the controlling agent share it without
/// further synchronization.
pub struct SessionManager {
    backend: Arc<dyn CoordinationBackend>,
    name: String,
    ttl: String,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn CoordinationBackend>, name: impl Into<String>, ttl: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            ttl: ttl.into(),
        }
    }

    pub fn ttl(&self) -> &str {
        &self.ttl
    }

    /// Request a new ephemeral lease from the backend.
    ///
    /// The TTL is validated locally first; an out-of-bounds value is
    /// [`ElectionError::InvalidTtl`] and is never retried.
    pub async fn create(&self) -> Result<String> {
        parse_ttl(&self.ttl)?;

        let session_id = self
            .backend
            .create_session(SessionRequest {
                name: self.name.clone(),
                ttl: self.ttl.clone(),
                behavior: SESSION_BEHAVIOR.to_string(),
                lock_delay: SESSION_LOCK_DELAY.to_string(),
            })
            .await?;

        info!(session_id = %session_id, ttl = %self.ttl, "session created");
        Ok(session_id)
    }

    /// Renew the lease on a fixed cadence (ttl/2) until `done` fires.
    ///
    /// Runs for the agent's entire active lifetime. A failed renewal attempt
    /// is logged and the loop keeps going: the lease survives until its full
    /// TTL lapses, so giving up on the first hiccup would surrender the lock
    /// early. The one early exit is the backend reporting the session gone
    /// (`SessionNotFound`), which no amount of retrying can revive.
    ///
    /// Returns `Ok(())` once `done` is observed, within one tick interval.
    pub async fn renew_periodic(&self, session_id: &str, done: &DoneSignal) -> Result<()> {
        let interval = renewal_interval(parse_ttl(&self.ttl)?);
        debug!(
            session_id = %session_id,
            interval_ms = interval.as_millis() as u64,
            "renewal loop started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.backend.renew_session(session_id).await {
                        Ok(()) => {
                            debug!(session_id = %session_id, "session renewed");
                        }
                        Err(ElectionError::SessionNotFound(id)) => {
                            warn!(session_id = %id, "session lost; stopping renewal loop");
                            return Err(ElectionError::SessionNotFound(id));
                        }
                        Err(e) => {
                            warn!(session_id = %session_id, error = %e, "renewal attempt failed; retrying on cadence");
                        }
                    }
                }
                _ = done.cancelled() => {
                    info!(session_id = %session_id, "renewal loop stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Explicitly terminate the lease. With behavior "delete" this atomically
    /// clears any lock key bound to it.
    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        self.backend.destroy_session(session_id).await?;
        info!(session_id = %session_id, "session destroyed");
        Ok(())
    }
}

/// Renew at half the TTL, leaving one missed attempt's worth of slack before
/// the lease lapses.
fn renewal_interval(ttl: Duration) -> Duration {
    ttl / 2
}

/// Parse a duration string ("500ms", "10s", "1m", "1h"; bare numbers are
/// seconds). Zero or unparseable values are [`ElectionError::InvalidTtl`].
pub(crate) fn parse_ttl(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ElectionError::InvalidTtl("empty ttl".to_string()));
    }

    let (num_str, unit_ms) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, 1u64)
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, 1000u64)
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 60_000u64)
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, 3_600_000u64)
    } else {
        (s, 1000u64)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| ElectionError::InvalidTtl(format!("unparseable ttl {:?}", s)))?;

    let millis = num
        .checked_mul(unit_ms)
        .ok_or_else(|| ElectionError::InvalidTtl(format!("ttl {:?} out of range", s)))?;
    if millis == 0 {
        return Err(ElectionError::InvalidTtl(format!("zero ttl {:?}", s)));
    }

    Ok(Duration::from_millis(millis))
}
