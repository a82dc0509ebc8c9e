//! Warden Election - distributed mutual exclusion and leader designation
//!
//! Layered on a strongly-consistent KV store with ephemeral sessions (Consul
//! or compatible). A process obtains an exclusive right over a named resource
//! key by binding the key to a TTL lease; the lease is kept alive by a
//! background renewal loop and the key disappears automatically when the
//! holder dies, making the lock self-healing.
//!
//! ## Components
//!
//! - [`SessionManager`]: lease lifecycle (create, periodic renew, destroy)
//! - [`LockCoordinator`]: check-and-set acquisition and holder lookup
//! - [`AgentIdentity`]: this process's `host:port`, used as the lock value
//! - [`ElectionAgent`]: composition plus registration and shutdown
//! - [`CoordinationBackend`]: the seam to the backing store, with a Consul
//!   binding ([`consul::ConsulBackend`]) and an embedded in-memory backend
//!   ([`memory::MemoryBackend`]) for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden_election::{ElectionAgent, ElectionConfig, memory::MemoryBackend};
//!
//! # async fn example() -> warden_election::Result<()> {
//! let config = ElectionConfig::new("shard-worker", "10.0.0.5", 9090)
//!     .with_session_ttl("10s");
//! let agent = ElectionAgent::new(config, Arc::new(MemoryBackend::new()));
//!
//! agent.start_session().await?;
//! let renewal = agent.spawn_renewal();
//! if agent.acquire("leader/shard-3").await? {
//!     // this process is the exclusive holder
//! }
//! agent.close().await?;
//! renewal.await.ok();
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod backend;
pub mod consul;
pub mod error;
pub mod identity;
pub mod lock;
pub mod memory;
pub mod session;
pub mod signal;

pub use agent::{ElectionAgent, ElectionConfig};
pub use backend::{CoordinationBackend, LockRecord, ServiceDescriptor, SessionRequest};
pub use error::{ElectionError, Result};
pub use identity::AgentIdentity;
pub use lock::LockCoordinator;
pub use session::SessionManager;
pub use signal::DoneSignal;
