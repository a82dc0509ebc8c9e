//! End-to-end election behavior against the embedded backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use warden_election::memory::MemoryBackend;
use warden_election::{
    CoordinationBackend, ElectionAgent, ElectionConfig, ElectionError, LockRecord, Result,
    ServiceDescriptor, SessionRequest,
};

fn agent(name: &str, host: &str, port: u16, backend: Arc<dyn CoordinationBackend>) -> ElectionAgent {
    let config = ElectionConfig::new(name, host, port).with_session_ttl("10s");
    ElectionAgent::new(config, backend)
}

#[tokio::test]
async fn test_only_one_agent_holds_the_key() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());
    let b = agent("shard-worker", "10.0.0.6", 9090, backend.clone());

    a.start_session().await.unwrap();
    b.start_session().await.unwrap();

    assert!(a.acquire("leader/shard-3").await.unwrap());
    assert!(!b.acquire("leader/shard-3").await.unwrap());

    // Re-acquire by the holder stays true; the loser stays false.
    assert!(a.acquire("leader/shard-3").await.unwrap());
    assert!(!b.acquire("leader/shard-3").await.unwrap());
}

#[tokio::test]
async fn test_loser_learns_the_holder_address() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());
    let b = agent("shard-worker", "10.0.0.6", 9090, backend.clone());

    a.start_session().await.unwrap();
    b.start_session().await.unwrap();

    assert!(a.acquire("leader/shard-3").await.unwrap());
    assert!(!b.acquire("leader/shard-3").await.unwrap());

    let address = b.lookup_holder("leader/shard-3").await.unwrap();
    assert_eq!(address, "10.0.0.5:9090");

    let err = a.lookup_holder("leader/shard-3").await.unwrap_err();
    assert!(matches!(err, ElectionError::SelfIsHolder));
}

#[tokio::test]
async fn test_lookup_with_no_holder() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend);

    a.start_session().await.unwrap();

    let err = a.lookup_holder("leader/shard-3").await.unwrap_err();
    assert!(matches!(err, ElectionError::NoHolder));
}

#[tokio::test]
async fn test_close_frees_the_key_for_the_next_agent() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());
    let b = agent("shard-worker", "10.0.0.6", 9090, backend.clone());

    a.start_session().await.unwrap();
    b.start_session().await.unwrap();

    assert!(a.acquire("leader/shard-3").await.unwrap());
    assert!(!b.acquire("leader/shard-3").await.unwrap());

    // Holder shuts down; its session-bound key is deleted with the lease.
    a.close().await.unwrap();

    let err = b.lookup_holder("leader/shard-3").await.unwrap_err();
    assert!(matches!(err, ElectionError::NoHolder));
    assert!(b.acquire("leader/shard-3").await.unwrap());
}

#[tokio::test]
async fn test_crashed_holder_is_healed_by_expiry() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());
    let b = agent("shard-worker", "10.0.0.6", 9090, backend.clone());

    let a_session = a.start_session().await.unwrap();
    b.start_session().await.unwrap();

    assert!(a.acquire("leader/shard-3").await.unwrap());

    // Simulate the holder dying without calling close.
    backend.expire_session(&a_session);

    assert!(b.acquire("leader/shard-3").await.unwrap());
    assert_eq!(
        a.lookup_holder("leader/shard-3").await.unwrap(),
        "10.0.0.6:9090"
    );
}

#[tokio::test]
async fn test_close_after_backend_lost_the_session() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());

    let session = a.start_session().await.unwrap();
    backend.expire_session(&session);

    // Shutdown of an already-expired agent must not fail.
    a.close().await.unwrap();
}

/// Delegating backend that counts renew calls, for asserting the renewal
/// loop's start/stop behavior from the outside.
struct CountingBackend {
    inner: MemoryBackend,
    renews: AtomicUsize,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            renews: AtomicUsize::new(0),
        }
    }

    fn renew_count(&self) -> usize {
        self.renews.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoordinationBackend for CountingBackend {
    async fn create_session(&self, req: SessionRequest) -> Result<String> {
        self.inner.create_session(req).await
    }

    async fn renew_session(&self, session_id: &str) -> Result<()> {
        self.renews.fetch_add(1, Ordering::SeqCst);
        self.inner.renew_session(session_id).await
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        self.inner.destroy_session(session_id).await
    }

    async fn acquire(&self, key: &str, value: &[u8], session_id: &str) -> Result<bool> {
        self.inner.acquire(key, value, session_id).await
    }

    async fn get(&self, key: &str) -> Result<Option<LockRecord>> {
        self.inner.get(key).await
    }

    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        self.inner.register_service(descriptor).await
    }
}

#[tokio::test]
async fn test_renewal_runs_until_close_and_then_stops() {
    let backend = Arc::new(CountingBackend::new());
    let config = ElectionConfig::new("shard-worker", "10.0.0.5", 9090).with_session_ttl("200ms");
    let a = ElectionAgent::new(config, backend.clone());

    a.start_session().await.unwrap();
    let renewal = a.spawn_renewal();

    // ttl/2 cadence means several renewals land within this window.
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert!(backend.renew_count() >= 2);

    a.close().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(1), renewal)
        .await
        .expect("renewal task must stop after close")
        .unwrap();
    assert!(result.is_ok());

    // No further renewals once the loop has stopped.
    let settled = backend.renew_count();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.renew_count(), settled);
}

#[tokio::test]
async fn test_failover_round_trip() {
    let backend = Arc::new(MemoryBackend::new());
    let a = agent("shard-worker", "10.0.0.5", 9090, backend.clone());
    let b = agent("shard-worker", "10.0.0.6", 9090, backend.clone());

    a.register().await.unwrap();
    a.start_session().await.unwrap();
    b.start_session().await.unwrap();

    // A wins the election; B routes to A.
    assert!(a.acquire("leader/shard-3").await.unwrap());
    assert!(!b.acquire("leader/shard-3").await.unwrap());
    assert_eq!(
        b.lookup_holder("leader/shard-3").await.unwrap(),
        "10.0.0.5:9090"
    );

    // A steps down; B takes over on its next attempt.
    a.close().await.unwrap();
    assert!(b.acquire("leader/shard-3").await.unwrap());
    assert_eq!(
        a.lookup_holder("leader/shard-3").await.unwrap(),
        "10.0.0.6:9090"
    );
}
