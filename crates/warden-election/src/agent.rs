//! Agent composition: identity, registration, session, lock, shutdown.

use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::{CoordinationBackend, ServiceDescriptor};
use crate::error::{ElectionError, Result};
use crate::identity::AgentIdentity;
use crate::lock::LockCoordinator;
use crate::session::SessionManager;
use crate::signal::DoneSignal;

/// Configuration surface consumed by the agent.
///
/// Values only; behavior (retry cadence, who calls what when) stays with the
/// caller.
#[derive(Clone, Debug)]
pub struct ElectionConfig {
    /// Service id for registration (defaults to the service name)
    pub service_id: String,
    /// Service name; also used as the session name
    pub service_name: String,
    /// Tags attached to the service registration
    pub tags: Vec<String>,
    /// This process's advertised host
    pub host: String,
    /// This process's advertised port
    pub port: u16,
    /// Health check interval duration string
    pub check_interval: String,
    /// Deregister the service after being critical for this long
    pub deregister_after: String,
    /// Session TTL duration string
    pub session_ttl: String,
}

impl ElectionConfig {
    pub fn new(service_name: &str, host: &str, port: u16) -> Self {
        Self {
            service_id: service_name.to_string(),
            service_name: service_name.to_string(),
            tags: Vec::new(),
            host: host.to_string(),
            port,
            check_interval: "10s".to_string(),
            deregister_after: "30m".to_string(),
            session_ttl: "15s".to_string(),
        }
    }

    pub fn with_service_id(mut self, id: &str) -> Self {
        self.service_id = id.to_string();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_session_ttl(mut self, ttl: &str) -> Self {
        self.session_ttl = ttl.to_string();
        self
    }

    pub fn with_health_check(mut self, interval: &str, deregister_after: &str) -> Self {
        self.check_interval = interval.to_string();
        self.deregister_after = deregister_after.to_string();
        self
    }

    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor {
            id: self.service_id.clone(),
            name: self.service_name.clone(),
            tags: self.tags.clone(),
            address: self.host.clone(),
            port: self.port,
            check_interval: self.check_interval.clone(),
            check_grpc: format!("{}:{}/{}", self.host, self.port, self.service_name),
            deregister_after: self.deregister_after.clone(),
        }
    }
}

/// One process's handle on the election protocol.
///
/// Lifecycle: construct, optionally [`register`](Self::register), then
/// [`start_session`](Self::start_session), [`spawn_renewal`](Self::spawn_renewal),
/// and attempt [`acquire`](Self::acquire) on whatever cadence the caller
/// chooses. [`close`](Self::close) stops renewal and destroys the lease;
/// afterwards every session-bound operation fails with `SessionNotFound`.
pub struct ElectionAgent {
    identity: AgentIdentity,
    backend: Arc<dyn CoordinationBackend>,
    config: ElectionConfig,
    sessions: Arc<SessionManager>,
    locks: LockCoordinator,
    session_id: RwLock<Option<String>>,
    done: DoneSignal,
}

impl ElectionAgent {
    pub fn new(config: ElectionConfig, backend: Arc<dyn CoordinationBackend>) -> Self {
        let identity = AgentIdentity::new(config.host.clone(), config.port);
        let sessions = Arc::new(SessionManager::new(
            backend.clone(),
            config.service_name.clone(),
            config.session_ttl.clone(),
        ));
        let locks = LockCoordinator::new(backend.clone());

        Self {
            identity,
            backend,
            config,
            sessions,
            locks,
            session_id: RwLock::new(None),
            done: DoneSignal::new(),
        }
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    /// The active session id, if a session has been started and not closed.
    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Register this process as a discoverable service with a gRPC health
    /// check. Pass-through to the backend's registration facade.
    pub async fn register(&self) -> Result<()> {
        self.backend
            .register_service(&self.config.descriptor())
            .await
    }

    /// Create the agent's lease.
    pub async fn start_session(&self) -> Result<String> {
        let session_id = self.sessions.create().await?;
        *self.session_id.write().unwrap_or_else(|e| e.into_inner()) = Some(session_id.clone());
        Ok(session_id)
    }

    /// Run the renewal loop on a background task for the agent's lifetime.
    ///
    /// The task ends when [`close`](Self::close) signals shutdown, or early
    /// with `SessionNotFound` if the backend loses the lease for good.
    pub fn spawn_renewal(&self) -> JoinHandle<Result<()>> {
        let sessions = self.sessions.clone();
        let done = self.done.clone();
        let session_id = self.session_id();

        tokio::spawn(async move {
            let session_id = session_id.ok_or_else(|| {
                ElectionError::SessionNotFound("no active session to renew".to_string())
            })?;
            sessions.renew_periodic(&session_id, &done).await
        })
    }

    /// Attempt to acquire `key` with this agent's identity and session.
    ///
    /// `Ok(true)`: this agent is now (or still) the exclusive holder.
    /// `Ok(false)`: another live session holds it.
    pub async fn acquire(&self, key: &str) -> Result<bool> {
        let session_id = self.require_session()?;
        self.locks.acquire(key, &session_id, &self.identity).await
    }

    /// Who currently holds `key`. See [`LockCoordinator::lookup_holder`] for
    /// the `NoHolder` / `SelfIsHolder` / address trichotomy.
    pub async fn lookup_holder(&self, key: &str) -> Result<String> {
        self.locks.lookup_holder(key, &self.identity).await
    }

    /// Shut down: stop the renewal loop and destroy the active lease.
    ///
    /// A `SessionNotFound` from destroy means the lease had already lapsed
    /// on the backend; shutdown should not fail loudly over that, so it is
    /// logged and swallowed. Other backend errors propagate.
    pub async fn close(&self) -> Result<()> {
        self.done.signal();

        let session_id = self
            .session_id
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(session_id) = session_id {
            match self.sessions.destroy(&session_id).await {
                Ok(()) => {}
                Err(ElectionError::SessionNotFound(id)) => {
                    warn!(session_id = %id, "session already gone at shutdown");
                }
                Err(e) => return Err(e),
            }
        }

        info!(identity = %self.identity, "agent closed");
        Ok(())
    }

    fn require_session(&self) -> Result<String> {
        self.session_id()
            .ok_or_else(|| ElectionError::SessionNotFound("no active session".to_string()))
    }
}
