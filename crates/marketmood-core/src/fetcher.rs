//! Resilient fetcher: produces one [`MarketSnapshot`] per cycle, degrading
//! through the cache tiers rather than failing.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{AlternativeMeApi, CoinGeckoApi};
use crate::cache::SnapshotCache;
use crate::fallback::FallbackStore;
use crate::http_client::HttpClient;
use crate::pacing::CallPacer;
use crate::retry::RetryConfig;
use crate::{FetchError, MarketSnapshot, UtcDateTime};

/// Tunables for one fetcher instance.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Per-call timeout budget; the upstream contract is at most 10s.
    pub timeout_ms: u64,
    /// In-memory snapshot TTL.
    pub cache_ttl: Duration,
    /// Minimum spacing between sub-fetch calls.
    pub min_call_interval: Duration,
    pub retry: RetryConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            cache_ttl: Duration::from_secs(600),
            min_call_interval: Duration::from_millis(500),
            retry: RetryConfig::default(),
        }
    }
}

/// Orchestrates the upstream adapters with pacing, retries, an in-memory
/// TTL cache, and a durable fallback cache.
pub struct Fetcher {
    sentiment: AlternativeMeApi,
    markets: CoinGeckoApi,
    cache: SnapshotCache,
    fallback: FallbackStore,
    pacer: CallPacer,
    retry: RetryConfig,
}

impl Fetcher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        fallback_path: impl Into<PathBuf>,
        config: FetcherConfig,
    ) -> Self {
        Self::with_parts(
            AlternativeMeApi::new(Arc::clone(&http)).with_timeout_ms(config.timeout_ms),
            CoinGeckoApi::new(http).with_timeout_ms(config.timeout_ms),
            SnapshotCache::new(config.cache_ttl),
            FallbackStore::new(fallback_path),
            CallPacer::new(config.min_call_interval),
            config.retry,
        )
    }

    /// Assembles a fetcher from pre-built parts; tests use this to inject
    /// scripted transports, controllable clocks, and temp directories.
    pub fn with_parts(
        sentiment: AlternativeMeApi,
        markets: CoinGeckoApi,
        cache: SnapshotCache,
        fallback: FallbackStore,
        pacer: CallPacer,
        retry: RetryConfig,
    ) -> Self {
        Self {
            sentiment,
            markets,
            cache,
            fallback,
            pacer,
            retry,
        }
    }

    /// One fetch cycle.
    ///
    /// Resolution order: fresh in-memory cache, then live sub-fetches (each
    /// retried once), then the durable fallback cache. `is_stale` is set
    /// only when no live sub-fetch succeeded and the snapshot came from the
    /// fallback file. With no fallback available either, the cycle is a
    /// hard [`FetchError::NoDataAvailable`]; data is never fabricated.
    pub async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError> {
        if let Some(cached) = self.cache.get().await {
            tracing::debug!("serving snapshot from in-memory cache");
            return Ok(cached);
        }

        let sentiment = self.sub_fetch("fear_greed", || self.sentiment.fear_greed()).await;
        let global = self.sub_fetch("global", || self.markets.global()).await;
        let bitcoin = self.sub_fetch("simple_price", || self.markets.bitcoin()).await;
        let coins = self.sub_fetch("markets", || self.markets.markets()).await;

        let live_successes = [
            sentiment.is_ok(),
            global.is_ok(),
            bitcoin.is_ok(),
            coins.is_ok(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count();

        if live_successes == 0 {
            let cause = [
                sentiment.as_ref().err(),
                global.as_ref().err(),
                bitcoin.as_ref().err(),
                coins.as_ref().err(),
            ]
            .iter()
            .flatten()
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("; ");

            if let Some(stored) = self.fallback.load() {
                tracing::warn!(
                    saved_at = %stored.saved_at,
                    %cause,
                    "all live sub-fetches failed; serving stale fallback snapshot"
                );
                let mut snapshot = stored.snapshot;
                snapshot.is_stale = true;
                return Ok(snapshot);
            }

            return Err(FetchError::NoDataAvailable { cause });
        }

        let fully_live = live_successes == 4;
        let snapshot = MarketSnapshot {
            sentiment: sentiment.ok(),
            global: global.ok(),
            bitcoin: bitcoin.ok(),
            coins: coins.unwrap_or_default(),
            fetched_at: UtcDateTime::now(),
            is_stale: false,
        };

        if fully_live {
            self.cache.put(snapshot.clone()).await;
            // Durability is best-effort; the in-memory answer still stands.
            if let Err(err) = self.fallback.save(&snapshot) {
                tracing::warn!(%err, "failed to persist fallback snapshot");
            }
        } else {
            tracing::warn!(
                failed = 4 - live_successes,
                "partial live cycle; snapshot has missing sections"
            );
        }

        Ok(snapshot)
    }

    /// Invalidate the in-memory cache, forcing the next cycle live.
    pub async fn invalidate_cache(&self) {
        self.cache.invalidate().await;
    }

    async fn sub_fetch<T, F, Fut>(&self, endpoint: &'static str, mut call: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.pacer.pace().await;
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        endpoint,
                        %err,
                        retry_in_ms = delay.as_millis() as u64,
                        "sub-fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(endpoint, %err, "sub-fetch failed after retry");
                    return Err(err);
                }
            }
        }
    }
}
