//! Consul binding for [`CoordinationBackend`].

use async_trait::async_trait;
use warden_consul_client::{
    AgentServiceCheck, AgentServiceRegistration, ConsulApiError, ConsulClient,
    SessionCreateRequest,
};

use crate::backend::{CoordinationBackend, LockRecord, ServiceDescriptor, SessionRequest};
use crate::error::{ElectionError, Result};

/// Adapter mapping the Consul SDK onto the backend trait and the error
/// taxonomy.
pub struct ConsulBackend {
    client: ConsulClient,
}

impl ConsulBackend {
    pub fn new(client: ConsulClient) -> Self {
        Self { client }
    }
}

/// Map an SDK error from a session-scoped call into the taxonomy. A 404
/// means the backend no longer knows the id; everything else is treated as
/// the backend being unreachable or misbehaving.
fn map_session_error(session_id: &str, e: ConsulApiError) -> ElectionError {
    match e {
        ConsulApiError::Status { status, .. } if status == 404 => {
            ElectionError::SessionNotFound(session_id.to_string())
        }
        other => ElectionError::BackendUnavailable(other.to_string()),
    }
}

#[async_trait]
impl CoordinationBackend for ConsulBackend {
    async fn create_session(&self, req: SessionRequest) -> Result<String> {
        let wire = SessionCreateRequest {
            name: Some(req.name),
            node: None,
            lock_delay: Some(req.lock_delay),
            behavior: Some(req.behavior),
            ttl: Some(req.ttl.clone()),
        };

        self.client.create_session(&wire).await.map_err(|e| match e {
            // Consul answers 400 when the TTL is outside its accepted bounds.
            ConsulApiError::Status { status, body } if status == 400 => {
                ElectionError::InvalidTtl(format!("ttl {:?} rejected: {}", req.ttl, body))
            }
            other => ElectionError::BackendUnavailable(other.to_string()),
        })
    }

    async fn renew_session(&self, session_id: &str) -> Result<()> {
        self.client
            .renew_session(session_id)
            .await
            .map(|_| ())
            .map_err(|e| map_session_error(session_id, e))
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        let destroyed = self
            .client
            .destroy_session(session_id)
            .await
            .map_err(|e| map_session_error(session_id, e))?;
        if destroyed {
            Ok(())
        } else {
            Err(ElectionError::SessionNotFound(session_id.to_string()))
        }
    }

    async fn acquire(&self, key: &str, value: &[u8], session_id: &str) -> Result<bool> {
        self.client
            .kv_acquire(key, value, session_id)
            .await
            .map_err(|e| map_session_error(session_id, e))
    }

    async fn get(&self, key: &str) -> Result<Option<LockRecord>> {
        let pair = self
            .client
            .kv_get(key)
            .await
            .map_err(|e| ElectionError::BackendUnavailable(e.to_string()))?;

        Ok(pair.map(|p| LockRecord {
            value: p.raw_value().unwrap_or_default(),
            session: p.session,
        }))
    }

    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        let registration = AgentServiceRegistration {
            id: Some(descriptor.id.clone()),
            name: descriptor.name.clone(),
            tags: Some(descriptor.tags.clone()),
            address: Some(descriptor.address.clone()),
            port: Some(descriptor.port),
            meta: None,
            check: Some(AgentServiceCheck {
                check_id: None,
                name: None,
                interval: Some(descriptor.check_interval.clone()),
                grpc: Some(descriptor.check_grpc.clone()),
                timeout: None,
                deregister_critical_service_after: Some(descriptor.deregister_after.clone()),
            }),
        };

        self.client
            .register_service(&registration)
            .await
            .map_err(|e| ElectionError::BackendUnavailable(e.to_string()))
    }
}
