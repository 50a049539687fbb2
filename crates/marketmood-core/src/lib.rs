//! # Market Mood Core
//!
//! Data acquisition, scoring, and persistence pipeline for the Market Mood
//! risk monitor.
//!
//! ## Overview
//!
//! This crate provides the foundational components:
//!
//! - **Canonical domain models** for sentiment, global stats, coin entries,
//!   and the assembled market snapshot
//! - **Provider adapters** for the sentiment index and market-data APIs
//! - **Resilient fetcher** with pacing, single-retry, an in-memory TTL
//!   cache, and a durable on-disk fallback cache
//! - **Score calculator** implementing the fixed weighted formula
//! - **Pipeline entry point** returning one report per cycle
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (alternative.me, CoinGecko) |
//! | [`cache`] | In-memory snapshot TTL cache |
//! | [`domain`] | Domain models (snapshot, score result, status bands) |
//! | [`error`] | Error taxonomy |
//! | [`fallback`] | Durable fallback snapshot store |
//! | [`fetcher`] | Resilient fetch orchestration |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pacing`] | Minimum inter-call spacing |
//! | [`pipeline`] | Fetch/score/persist cycle |
//! | [`retry`] | Retry backoff policy |
//! | [`score`] | Weighted score calculator |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketmood_core::{fetch_and_calculate, Fetcher, FetcherConfig, ReqwestHttpClient};
//! use marketmood_history::HistoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = Arc::new(ReqwestHttpClient::new());
//!     let fetcher = Fetcher::new(http, "data/snapshot.json", FetcherConfig::default());
//!     let history = HistoryStore::open("data/score_history.json");
//!
//!     let report = fetch_and_calculate(&fetcher, &history).await?;
//!     println!("{:.1} ({})", report.result.score, report.result.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Degradation order
//!
//! ```text
//! ┌──────────────────┐
//! │ In-memory cache  │  fresh within TTL → served as-is
//! └────────┬─────────┘
//!          │ miss
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Live sub-fetches │────▶│ HTTP Client      │
//! │ (paced, 1 retry) │     │ (reqwest/mock)   │
//! └────────┬─────────┘
//!          │ all failed
//!          ▼
//! ┌──────────────────┐
//! │ Durable fallback │  present → snapshot served with is_stale = true
//! └────────┬─────────┘
//!          │ absent
//!          ▼
//!    hard error (NoDataAvailable); data is never fabricated
//! ```

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod http_client;
pub mod pacing;
pub mod pipeline;
pub mod retry;
pub mod score;

// Re-export commonly used types at crate root for convenience

// Adapters
pub use adapters::{AlternativeMeApi, CoinGeckoApi};

// Caching
pub use cache::SnapshotCache;

// Domain models
pub use domain::{
    BitcoinQuote, CoinMarketEntry, ComponentBreakdown, ComponentKind, ComponentTerm,
    GlobalMarketStats, MarketSnapshot, RiskScoreResult, RiskStatus, SentimentReading, TopMovers,
    UtcDateTime, MIN_MOVER_MARKET_CAP_USD, MOVERS_PER_SIDE,
};

// Error types
pub use error::{FetchError, PersistenceError, ScoreError, ValidationError};

// Fallback store
pub use fallback::{FallbackStore, StoredSnapshot};

// Fetcher
pub use fetcher::{Fetcher, FetcherConfig};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Pacing and retry
pub use pacing::CallPacer;
pub use retry::{Backoff, RetryConfig};

// Pipeline
pub use pipeline::{fetch_and_calculate, MoodReport, PipelineError};

// History (re-exported from marketmood-history)
pub use marketmood_history::{
    HistoricalLookups, HistoricalScoreEntry, HistoryError, HistoryStore, Lookback,
};
