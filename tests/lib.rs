//! Shared fixtures for the behavior test suites: a scripted HTTP transport
//! and canned upstream response bodies.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketmood_core::{
    AlternativeMeApi, Backoff, CallPacer, CoinGeckoApi, FallbackStore, Fetcher, HttpClient,
    HttpError, HttpRequest, HttpResponse, RetryConfig, SnapshotCache,
};

pub const FNG_BODY: &str = r#"{"data": [
    {"value": "20", "value_classification": "Extreme Fear", "timestamp": "1704067200"},
    {"value": "25", "value_classification": "Extreme Fear", "timestamp": "1703980800"},
    {"value": "31", "value_classification": "Fear", "timestamp": "1703894400"}
]}"#;

pub const GLOBAL_BODY: &str = r#"{
    "data": {
        "total_market_cap": {"usd": 2500000000000.0},
        "total_volume": {"usd": 137500000000.0},
        "market_cap_percentage": {"btc": 52.3, "eth": 16.8},
        "active_cryptocurrencies": 10423
    }
}"#;

pub const BTC_BODY: &str =
    r#"{"bitcoin": {"usd": 64000.0, "usd_24h_vol": 31000000000.0, "usd_24h_change": -2.4}}"#;

pub const MARKETS_BODY: &str = r#"[
    {"symbol": "btc", "name": "Bitcoin", "current_price": 64000.0,
     "price_change_percentage_24h": 1.2, "market_cap": 1300000000000.0, "total_volume": 30000000000.0},
    {"symbol": "eth", "name": "Ethereum", "current_price": 3000.0,
     "price_change_percentage_24h": -0.8, "market_cap": 400000000000.0, "total_volume": 15000000000.0},
    {"symbol": "sol", "name": "Solana", "current_price": 140.0,
     "price_change_percentage_24h": 4.6, "market_cap": 62000000000.0, "total_volume": 2500000000.0},
    {"symbol": "tiny", "name": "Tinycoin", "current_price": 0.002,
     "price_change_percentage_24h": 40.0, "market_cap": 900000.0, "total_volume": 20000.0}
]"#;

/// Scripted transport: pops one canned result per request and records the
/// URLs it was asked for, in order.
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    pub urls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.urls.lock().map(|urls| urls.len()).unwrap_or(0)
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            if let Ok(mut urls) = self.urls.lock() {
                urls.push(request.url.clone());
            }
            self.responses
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .unwrap_or_else(|| Err(HttpError::new("script exhausted")))
        })
    }
}

/// One full live cycle worth of responses, in sub-fetch order.
pub fn live_cycle_responses() -> Vec<Result<HttpResponse, HttpError>> {
    vec![
        Ok(HttpResponse::ok_json(FNG_BODY)),
        Ok(HttpResponse::ok_json(GLOBAL_BODY)),
        Ok(HttpResponse::ok_json(BTC_BODY)),
        Ok(HttpResponse::ok_json(MARKETS_BODY)),
    ]
}

/// Fetcher wired for tests: scripted transport, millisecond pacing and
/// backoff so suites stay fast.
pub fn test_fetcher(
    http: Arc<ScriptedHttpClient>,
    fallback: FallbackStore,
    cache_ttl: Duration,
) -> Fetcher {
    Fetcher::with_parts(
        AlternativeMeApi::new(http.clone()),
        CoinGeckoApi::new(http),
        SnapshotCache::new(cache_ttl),
        fallback,
        CallPacer::new(Duration::from_millis(1)),
        RetryConfig {
            max_retries: 1,
            backoff: Backoff::Fixed {
                delay: Duration::from_millis(1),
            },
        },
    )
}
