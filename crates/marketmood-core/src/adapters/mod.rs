//! Typed accessors for the two upstream providers.
//!
//! Each adapter parses the provider's payload into the domain types at the
//! boundary; shape violations become [`FetchError::MalformedResponse`]
//! instead of silently defaulted fields.

mod alternative_me;
mod coingecko;

pub use alternative_me::AlternativeMeApi;
pub use coingecko::CoinGeckoApi;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::http_client::{HttpClient, HttpRequest};
use crate::FetchError;

/// Shared GET-and-decode path for both adapters, mapping transport and
/// status failures onto the fetch error taxonomy.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http: &Arc<dyn HttpClient>,
    endpoint: &'static str,
    url: String,
    timeout_ms: u64,
) -> Result<T, FetchError> {
    tracing::debug!(endpoint, %url, "upstream call");

    let request = HttpRequest::get(url).with_timeout_ms(timeout_ms);
    let response = http.execute(request).await.map_err(|e| {
        if e.timed_out() {
            FetchError::Timeout { endpoint }
        } else {
            FetchError::Network {
                endpoint,
                detail: e.message().to_owned(),
            }
        }
    })?;

    if response.status == 429 {
        return Err(FetchError::RateLimited { endpoint });
    }
    if !response.is_success() {
        return Err(FetchError::UpstreamStatus {
            endpoint,
            status: response.status,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| FetchError::MalformedResponse {
        endpoint,
        detail: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

    /// Scripted transport replaying queued responses in call order.
    pub struct SequenceHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        pub urls: Mutex<Vec<String>>,
    }

    impl SequenceHttpClient {
        pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                urls: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpClient for SequenceHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.urls.lock().unwrap().push(request.url.clone());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("scripted responses exhausted")));
            Box::pin(async move { next })
        }
    }
}
