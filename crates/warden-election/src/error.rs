//! Error taxonomy for the election core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElectionError>;

/// Failure kinds callers branch on.
///
/// `NoHolder` and `SelfIsHolder` are expected outcomes of holder lookup, not
/// faults; they exist as variants so callers can branch with `matches!`
/// instead of string inspection.
#[derive(Debug, Error)]
pub enum ElectionError {
    /// Transient connectivity failure to the coordination backend. No retry
    /// is built in here; retry policy belongs to the caller.
    #[error("coordination backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Session TTL outside the backend's accepted bounds, or unparseable.
    /// Fatal to session creation; never retried.
    #[error("invalid session ttl: {0}")]
    InvalidTtl(String),

    /// The backend no longer recognizes the session id (destroyed or
    /// expired). Tolerated during shutdown, surfaced everywhere else since
    /// it means exclusivity has been lost.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Nobody holds the lock key (no value, or no live session bound to it).
    #[error("no holder for lock key")]
    NoHolder,

    /// The lookup found this process's own identity as the holder.
    #[error("this agent is the current holder")]
    SelfIsHolder,
}

impl ElectionError {
    /// True for the expected, non-exceptional lookup outcomes.
    pub fn is_lookup_outcome(&self) -> bool {
        matches!(self, ElectionError::NoHolder | ElectionError::SelfIsHolder)
    }
}
