//! Market-data adapter (CoinGecko global, simple-price, and markets endpoints).

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::HttpClient;
use crate::{BitcoinQuote, CoinMarketEntry, FetchError, GlobalMarketStats};

use super::fetch_json;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Ranked coin entries requested per cycle.
pub const MARKETS_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: HashMap<String, f64>,
    total_volume: HashMap<String, f64>,
    market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    active_cryptocurrencies: u32,
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: Option<BtcPriceRecord>,
}

#[derive(Debug, Deserialize)]
struct BtcPriceRecord {
    usd: f64,
    usd_24h_vol: f64,
    usd_24h_change: f64,
}

#[derive(Debug, Deserialize)]
struct MarketRecord {
    symbol: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
}

/// Typed accessor for the market-data provider.
#[derive(Clone)]
pub struct CoinGeckoApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl CoinGeckoApi {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Global market statistics (total cap, 24h volume, dominance).
    pub async fn global(&self) -> Result<GlobalMarketStats, FetchError> {
        const ENDPOINT: &str = "global";

        let url = format!("{}/global", self.base_url);
        let payload: GlobalResponse = fetch_json(&self.http, ENDPOINT, url, self.timeout_ms).await?;

        let usd = |map: &HashMap<String, f64>, field: &str| {
            map.get("usd").copied().ok_or_else(|| FetchError::MalformedResponse {
                endpoint: ENDPOINT,
                detail: format!("missing usd entry in {field}"),
            })
        };

        let total_market_cap = usd(&payload.data.total_market_cap, "total_market_cap")?;
        let total_volume = usd(&payload.data.total_volume, "total_volume")?;
        let btc_dominance = payload
            .data
            .market_cap_percentage
            .get("btc")
            .copied()
            .unwrap_or_default();
        let eth_dominance = payload
            .data
            .market_cap_percentage
            .get("eth")
            .copied()
            .unwrap_or_default();

        GlobalMarketStats::new(
            total_market_cap,
            total_volume,
            btc_dominance,
            eth_dominance,
            payload.data.active_cryptocurrencies,
        )
        .map_err(FetchError::Validation)
    }

    /// Bitcoin spot price with 24h volume and change.
    pub async fn bitcoin(&self) -> Result<BitcoinQuote, FetchError> {
        const ENDPOINT: &str = "simple_price";

        let url = format!(
            "{}/simple/price?ids=bitcoin&vs_currencies=usd&include_24hr_vol=true&include_24hr_change=true",
            self.base_url
        );
        let payload: SimplePriceResponse =
            fetch_json(&self.http, ENDPOINT, url, self.timeout_ms).await?;

        let record = payload.bitcoin.ok_or(FetchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: String::from("missing bitcoin entry"),
        })?;

        BitcoinQuote::new(record.usd, record.usd_24h_vol, record.usd_24h_change)
            .map_err(FetchError::Validation)
    }

    /// Top coins ranked by market cap, up to [`MARKETS_PAGE_SIZE`].
    ///
    /// Entries missing a price or market cap (delistings mid-update) are
    /// dropped rather than zero-filled.
    pub async fn markets(&self) -> Result<Vec<CoinMarketEntry>, FetchError> {
        const ENDPOINT: &str = "markets";

        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url, MARKETS_PAGE_SIZE
        );
        let records: Vec<MarketRecord> =
            fetch_json(&self.http, ENDPOINT, url, self.timeout_ms).await?;

        if records.is_empty() {
            return Err(FetchError::MalformedResponse {
                endpoint: ENDPOINT,
                detail: String::from("empty markets array"),
            });
        }

        let total = records.len();
        let coins: Vec<CoinMarketEntry> = records
            .into_iter()
            .filter_map(|record| {
                let price = record.current_price?;
                let market_cap = record.market_cap?;
                CoinMarketEntry::new(
                    record.symbol,
                    record.name,
                    price,
                    record.price_change_percentage_24h,
                    market_cap,
                    record.total_volume.unwrap_or_default(),
                )
                .ok()
            })
            .collect();

        if coins.len() < total {
            tracing::debug!(dropped = total - coins.len(), "markets entries without price or cap");
        }

        Ok(coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::SequenceHttpClient;
    use crate::http_client::{HttpError, HttpResponse};

    #[tokio::test]
    async fn parses_global_statistics() {
        let body = r#"{
            "data": {
                "total_market_cap": {"usd": 2500000000000.0, "eur": 2300000000000.0},
                "total_volume": {"usd": 137500000000.0},
                "market_cap_percentage": {"btc": 52.3, "eth": 16.8},
                "active_cryptocurrencies": 10423
            }
        }"#;
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
        let api = CoinGeckoApi::new(http);

        let stats = api.global().await.expect("valid payload parses");
        assert_eq!(stats.total_market_cap_usd, 2.5e12);
        assert_eq!(stats.btc_dominance_pct, 52.3);
        assert_eq!(stats.active_cryptocurrencies, 10423);
        let ratio = stats.volume_to_cap_ratio_pct().expect("cap is non-zero");
        assert!((ratio - 5.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_usd_bucket_is_malformed() {
        let body = r#"{
            "data": {
                "total_market_cap": {"eur": 1.0},
                "total_volume": {"usd": 1.0},
                "market_cap_percentage": {}
            }
        }"#;
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
        let api = CoinGeckoApi::new(http);

        let err = api.global().await.expect_err("missing usd must fail");
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn parses_bitcoin_simple_price() {
        let body = r#"{"bitcoin": {"usd": 64000.5, "usd_24h_vol": 31000000000.0, "usd_24h_change": -2.4}}"#;
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
        let api = CoinGeckoApi::new(http);

        let quote = api.bitcoin().await.expect("valid payload parses");
        assert_eq!(quote.price_usd, 64000.5);
        assert_eq!(quote.change_24h_pct, -2.4);
    }

    #[tokio::test]
    async fn markets_drops_entries_without_price() {
        let body = r#"[
            {"symbol": "btc", "name": "Bitcoin", "current_price": 64000.0,
             "price_change_percentage_24h": 1.2, "market_cap": 1300000000000.0, "total_volume": 30000000000.0},
            {"symbol": "husk", "name": "Husk", "current_price": null,
             "price_change_percentage_24h": null, "market_cap": null, "total_volume": null}
        ]"#;
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
        let api = CoinGeckoApi::new(http);

        let coins = api.markets().await.expect("valid payload parses");
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn transport_timeout_maps_to_timeout_error() {
        let http = SequenceHttpClient::new(vec![Err(HttpError::timeout("deadline exceeded"))]);
        let api = CoinGeckoApi::new(http);

        let err = api.global().await.expect_err("timeout must fail");
        assert!(matches!(err, FetchError::Timeout { endpoint: "global" }));
    }

    #[tokio::test]
    async fn server_error_maps_to_upstream_status() {
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse {
            status: 503,
            body: String::from("upstream unavailable"),
        })]);
        let api = CoinGeckoApi::new(http);

        let err = api.markets().await.expect_err("503 must fail");
        assert!(matches!(err, FetchError::UpstreamStatus { status: 503, .. }));
    }
}
