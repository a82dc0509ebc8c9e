//! Consul KV API
//!
//! Only the operations Warden's lock protocol needs: plain get, and the
//! session-bound acquire/release conditional writes.

use reqwest::StatusCode;
use tracing::debug;

use crate::client::{ConsulApiError, ConsulClient};
use crate::model::KvPair;

impl ConsulClient {
    /// Read a single key. `None` when the key does not exist (Consul 404).
    ///
    /// GET /v1/kv/{key}
    pub async fn kv_get(&self, key: &str) -> Result<Option<KvPair>, ConsulApiError> {
        let path = format!("/v1/kv/{}", key);
        match self.get_json::<Vec<KvPair>>(&path, &[]).await {
            Ok(pairs) => Ok(pairs.into_iter().next()),
            Err(ConsulApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check-and-set acquire: write `value` under `key` bound to `session_id`.
    /// Succeeds only if the key is free or already held by this session.
    ///
    /// PUT /v1/kv/{key}?acquire={session} -> bool
    pub async fn kv_acquire(
        &self,
        key: &str,
        value: &[u8],
        session_id: &str,
    ) -> Result<bool, ConsulApiError> {
        let path = format!("/v1/kv/{}", key);
        let acquired: bool = self
            .put_json(&path, &[("acquire", session_id)], Some(value.to_vec()))
            .await?;
        debug!(key = %key, session_id = %session_id, acquired, "kv acquire");
        Ok(acquired)
    }

    /// Release a session-held key, keeping the value in place.
    ///
    /// PUT /v1/kv/{key}?release={session} -> bool
    pub async fn kv_release(
        &self,
        key: &str,
        value: &[u8],
        session_id: &str,
    ) -> Result<bool, ConsulApiError> {
        let path = format!("/v1/kv/{}", key);
        let released: bool = self
            .put_json(&path, &[("release", session_id)], Some(value.to_vec()))
            .await?;
        debug!(key = %key, session_id = %session_id, released, "kv release");
        Ok(released)
    }

    /// Delete a key unconditionally.
    ///
    /// DELETE /v1/kv/{key} -> bool
    pub async fn kv_delete(&self, key: &str) -> Result<bool, ConsulApiError> {
        let path = format!("/v1/kv/{}", key);
        self.delete_json(&path).await
    }
}
