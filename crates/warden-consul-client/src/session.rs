//! Consul Session API
//!
//! Sessions are the lease primitive behind Warden's locks: a TTL-bound token
//! whose expiry (with behavior "delete") removes every KV key bound to it.

use tracing::debug;

use crate::client::{ConsulApiError, ConsulClient};
use crate::model::{SessionCreateRequest, SessionCreateResponse, SessionEntry};

impl ConsulClient {
    /// Create a new session.
    ///
    /// PUT /v1/session/create
    pub async fn create_session(
        &self,
        req: &SessionCreateRequest,
    ) -> Result<String, ConsulApiError> {
        let response: SessionCreateResponse =
            self.put_json_body("/v1/session/create", req).await?;
        debug!(session_id = %response.id, "created consul session");
        Ok(response.id)
    }

    /// Renew a session, resetting its TTL clock.
    ///
    /// PUT /v1/session/renew/{id}. Consul answers with the session entry in a
    /// one-element array, or 404 when the session no longer exists.
    pub async fn renew_session(&self, session_id: &str) -> Result<SessionEntry, ConsulApiError> {
        let path = format!("/v1/session/renew/{}", session_id);
        let entries: Vec<SessionEntry> = self.put_json(&path, &[], None).await?;
        entries.into_iter().next().ok_or(ConsulApiError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: format!("session {} not found", session_id),
        })
    }

    /// Destroy a session. With behavior "delete" this also removes any KV
    /// keys bound to the session.
    ///
    /// PUT /v1/session/destroy/{id} -> bool
    pub async fn destroy_session(&self, session_id: &str) -> Result<bool, ConsulApiError> {
        let path = format!("/v1/session/destroy/{}", session_id);
        let destroyed: bool = self.put_json(&path, &[], None).await?;
        debug!(session_id = %session_id, destroyed, "destroyed consul session");
        Ok(destroyed)
    }

    /// Fetch session info. Consul returns an empty array for unknown ids.
    ///
    /// GET /v1/session/info/{id}
    pub async fn session_info(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionEntry>, ConsulApiError> {
        let path = format!("/v1/session/info/{}", session_id);
        let entries: Vec<SessionEntry> = self.get_json(&path, &[]).await?;
        Ok(entries.into_iter().next())
    }
}
