//! Sentiment index adapter (alternative.me Fear & Greed endpoint).

use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::HttpClient;
use crate::{FetchError, SentimentReading, UtcDateTime};

use super::fetch_json;

const DEFAULT_BASE_URL: &str = "https://api.alternative.me";
const ENDPOINT: &str = "fear_greed";

/// Days of daily history requested alongside the current reading.
pub const SENTIMENT_HISTORY_DAYS: usize = 7;

// The provider encodes every numeric field as a JSON string.
#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngRecord>,
}

#[derive(Debug, Deserialize)]
struct FngRecord {
    value: String,
    value_classification: String,
    timestamp: String,
}

/// Typed accessor for the sentiment index provider.
#[derive(Clone)]
pub struct AlternativeMeApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl AlternativeMeApi {
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

    /// Current index reading plus recent daily history, newest first.
    pub async fn fear_greed(&self) -> Result<SentimentReading, FetchError> {
        let url = format!(
            "{}/fng/?limit={}&format=json",
            self.base_url, SENTIMENT_HISTORY_DAYS
        );
        let payload: FngResponse = fetch_json(&self.http, ENDPOINT, url, self.timeout_ms).await?;

        let current = payload.data.first().ok_or(FetchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: String::from("empty data array"),
        })?;

        let value = parse_index_value(&current.value)?;
        let epoch = current
            .timestamp
            .parse::<i64>()
            .map_err(|_| malformed(format!("non-numeric timestamp '{}'", current.timestamp)))?;
        let timestamp = UtcDateTime::from_unix_timestamp(epoch)
            .map_err(|e| malformed(format!("invalid timestamp: {e}")))?;

        let history_7d = payload
            .data
            .iter()
            .map(|record| parse_index_value(&record.value))
            .collect::<Result<Vec<u8>, _>>()?;

        SentimentReading::new(value, current.value_classification.clone(), timestamp, history_7d)
            .map_err(FetchError::Validation)
    }
}

fn parse_index_value(raw: &str) -> Result<u8, FetchError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| malformed(format!("non-numeric index value '{raw}'")))?;
    if !(0..=100).contains(&value) {
        return Err(malformed(format!("index value {value} outside 0..=100")));
    }
    Ok(value as u8)
}

fn malformed(detail: String) -> FetchError {
    FetchError::MalformedResponse {
        endpoint: ENDPOINT,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::SequenceHttpClient;
    use crate::http_client::HttpResponse;

    const VALID_BODY: &str = r#"{
        "name": "Fear and Greed Index",
        "data": [
            {"value": "20", "value_classification": "Extreme Fear", "timestamp": "1704067200", "time_until_update": "3600"},
            {"value": "25", "value_classification": "Extreme Fear", "timestamp": "1703980800"},
            {"value": "31", "value_classification": "Fear", "timestamp": "1703894400"}
        ]
    }"#;

    #[tokio::test]
    async fn parses_current_value_and_history() {
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(VALID_BODY))]);
        let api = AlternativeMeApi::new(http.clone());

        let reading = api.fear_greed().await.expect("valid payload parses");
        assert_eq!(reading.value, 20);
        assert_eq!(reading.classification, "Extreme Fear");
        assert_eq!(reading.history_7d, vec![20, 25, 31]);
        assert_eq!(reading.timestamp.format_rfc3339(), "2024-01-01T00:00:00Z");

        let urls = http.urls.lock().unwrap();
        assert!(urls[0].contains("/fng/?limit=7"));
    }

    #[tokio::test]
    async fn empty_data_array_is_malformed() {
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(r#"{"data": []}"#))]);
        let api = AlternativeMeApi::new(http);

        let err = api.fear_greed().await.expect_err("empty data must fail");
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn out_of_scale_value_is_malformed_not_clamped() {
        let body = r#"{"data": [{"value": "140", "value_classification": "Greed", "timestamp": "1704067200"}]}"#;
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
        let api = AlternativeMeApi::new(http);

        let err = api.fear_greed().await.expect_err("140 must fail");
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn rate_limit_status_maps_to_rate_limited() {
        let http = SequenceHttpClient::new(vec![Ok(HttpResponse {
            status: 429,
            body: String::new(),
        })]);
        let api = AlternativeMeApi::new(http);

        let err = api.fear_greed().await.expect_err("429 must fail");
        assert!(matches!(err, FetchError::RateLimited { .. }));
    }
}
