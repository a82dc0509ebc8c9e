//! Consul-compatible HTTP client SDK for Warden
//!
//! A thin client over the Consul agent HTTP API, covering the three surfaces
//! Warden needs for coordination:
//! - Session API (`/v1/session/*`): ephemeral TTL leases
//! - KV API (`/v1/kv/*`): session-bound check-and-set acquire/release
//! - Agent API (`/v1/agent/service/*`): service registration with health checks
//!
//! The client is deliberately policy-free: no retries, no backoff, no caching.
//! Callers decide what to do with a [`ConsulApiError`].

pub mod agent;
pub mod client;
pub mod kv;
pub mod model;
pub mod session;

pub use client::{ConsulApiError, ConsulClient, ConsulClientConfig};
pub use model::{
    AgentServiceCheck, AgentServiceRegistration, KvPair, SessionCreateRequest,
    SessionCreateResponse, SessionEntry,
};
