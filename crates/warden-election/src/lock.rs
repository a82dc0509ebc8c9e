//! Lock acquisition and holder lookup.

use std::sync::Arc;

use tracing::debug;

use crate::backend::CoordinationBackend;
use crate::error::{ElectionError, Result};
use crate::identity::AgentIdentity;

/// Performs acquire attempts against named keys and answers "who holds it".
///
/// Holds no session state of its own; mutual exclusion comes entirely from
/// the backend's check-and-set semantics.
pub struct LockCoordinator {
    backend: Arc<dyn CoordinationBackend>,
}

impl LockCoordinator {
    pub fn new(backend: Arc<dyn CoordinationBackend>) -> Self {
        Self { backend }
    }

    /// Attempt a conditional write of `identity` into `key`, bound to the
    /// session.
    ///
    /// `Ok(false)` is the expected "another live session holds it" outcome,
    /// not a failure; retry cadence is the caller's decision.
    pub async fn acquire(
        &self,
        key: &str,
        session_id: &str,
        identity: &AgentIdentity,
    ) -> Result<bool> {
        let value = identity.lock_value();
        let acquired = self
            .backend
            .acquire(key, value.as_bytes(), session_id)
            .await?;
        debug!(key = %key, identity = %identity, acquired, "acquire attempt");
        Ok(acquired)
    }

    /// Resolve the current holder of `key`.
    ///
    /// Three outcomes:
    /// - nobody (no value, or no live session) => [`ElectionError::NoHolder`]
    /// - the stored value is our own identity => [`ElectionError::SelfIsHolder`],
    ///   so callers never route requests back to themselves
    /// - a different live holder => `Ok(address)`
    pub async fn lookup_holder(
        &self,
        key: &str,
        self_identity: &AgentIdentity,
    ) -> Result<String> {
        let record = self.backend.get(key).await?;

        let record = match record {
            Some(r) if r.session.is_some() => r,
            _ => {
                debug!(key = %key, "no live holder");
                return Err(ElectionError::NoHolder);
            }
        };

        let address = String::from_utf8(record.value)
            .map_err(|e| ElectionError::BackendUnavailable(format!("undecodable lock value: {}", e)))?;

        if address == self_identity.lock_value() {
            debug!(key = %key, "holder is self");
            return Err(ElectionError::SelfIsHolder);
        }

        debug!(key = %key, holder = %address, "holder resolved");
        Ok(address)
    }
}
