//! In-memory TTL cache for the assembled market snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::MarketSnapshot;

/// Clock source injected so tests can control expiry without sleeping.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: MarketSnapshot,
    stored_at: Instant,
}

/// Single-slot snapshot cache with a fixed TTL.
///
/// The fetcher produces exactly one snapshot per cycle, so there is no key
/// space to manage; the cache holds the last fully live snapshot and serves
/// it until the TTL elapses.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<tokio::sync::RwLock<Option<CacheEntry>>>,
    ttl: Duration,
    clock: Clock,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(Instant::now))
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(None)),
            ttl,
            clock,
        }
    }

    /// Returns the cached snapshot while it is within the TTL.
    pub async fn get(&self) -> Option<MarketSnapshot> {
        let slot = self.inner.read().await;
        let entry = slot.as_ref()?;
        let now = (self.clock)();
        if now.duration_since(entry.stored_at) <= self.ttl {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, snapshot: MarketSnapshot) {
        if self.ttl == Duration::ZERO {
            return;
        }
        let mut slot = self.inner.write().await;
        *slot = Some(CacheEntry {
            snapshot,
            stored_at: (self.clock)(),
        });
    }

    pub async fn invalidate(&self) {
        let mut slot = self.inner.write().await;
        *slot = None;
    }
}
