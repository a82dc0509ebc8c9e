//! The seam to the coordination backend.
//!
//! One canonical trait carries the complete contract: session lifecycle,
//! check-and-set KV, and the registration pass-through. Mutual exclusion is
//! enforced by the backend's acquire semantics, not locally, so every method
//! is an independent call with no local locking.

use async_trait::async_trait;

use crate::error::Result;

/// Parameters for creating an ephemeral session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Human-readable session name
    pub name: String,
    /// TTL duration string, e.g. "10s"
    pub ttl: String,
    /// Expiry behavior; "delete" removes affiliated keys when the lease lapses
    pub behavior: String,
    /// Grace period before a freed key becomes re-acquirable
    pub lock_delay: String,
}

/// Value and session binding currently stored under a lock key.
#[derive(Debug, Clone)]
pub struct LockRecord {
    pub value: Vec<u8>,
    /// `None` when no live session holds the key
    pub session: Option<String>,
}

/// Service descriptor handed to the registration facade once at startup.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub address: String,
    pub port: u16,
    /// Health check interval duration string
    pub check_interval: String,
    /// gRPC health check target, "host:port/service"
    pub check_grpc: String,
    /// Deregister the service after being critical for this long
    pub deregister_after: String,
}

/// Strongly-consistent KV store with session support.
///
/// Implementations: [`crate::consul::ConsulBackend`] (the real thing) and
/// [`crate::memory::MemoryBackend`] (embedded, for tests).
#[async_trait]
pub trait CoordinationBackend: Send + Sync {
    /// Create an ephemeral session; returns the backend-assigned opaque id.
    async fn create_session(&self, req: SessionRequest) -> Result<String>;

    /// Refresh the session's TTL clock.
    async fn renew_session(&self, session_id: &str) -> Result<()>;

    /// Explicitly terminate the session, triggering its expiry behavior.
    async fn destroy_session(&self, session_id: &str) -> Result<()>;

    /// Check-and-set write of `value` under `key`, bound to `session_id`.
    /// `Ok(false)` means another live session holds the key.
    async fn acquire(&self, key: &str, value: &[u8], session_id: &str) -> Result<bool>;

    /// Read the current record under `key`; `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<LockRecord>>;

    /// Register this process as a discoverable service (pass-through).
    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<()>;
}
