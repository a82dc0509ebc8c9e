//! Consul Agent API: service registration
//!
//! The registration facade consumed by Warden at startup. Semantics beyond
//! "hand the descriptor to Consul" are owned by Consul itself.

use tracing::info;

use crate::client::{ConsulApiError, ConsulClient};
use crate::model::AgentServiceRegistration;

impl ConsulClient {
    /// Register a service with the local Consul agent.
    ///
    /// PUT /v1/agent/service/register
    pub async fn register_service(
        &self,
        registration: &AgentServiceRegistration,
    ) -> Result<(), ConsulApiError> {
        self.put_unit("/v1/agent/service/register", Some(registration))
            .await?;
        info!(
            service = %registration.name,
            id = ?registration.id,
            "registered service with consul"
        );
        Ok(())
    }

    /// Deregister a service by id.
    ///
    /// PUT /v1/agent/service/deregister/{id}
    pub async fn deregister_service(&self, service_id: &str) -> Result<(), ConsulApiError> {
        let path = format!("/v1/agent/service/deregister/{}", service_id);
        self.put_unit::<()>(&path, None).await?;
        info!(id = %service_id, "deregistered service from consul");
        Ok(())
    }
}
