use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::error::{AppError, Context, Result};

/// Minimal HTTP capability the scraper needs: GET a URL and hand back the body text.
///
/// Non-2xx responses and transport failures are errors.
pub trait HttpClient: Sync {
    fn get(&self, url: &str, headers: &HeaderMap) -> impl Future<Output = Result<String>> + Send;
}

/// `HttpClient` backed by a shared `reqwest::Client` with a global per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to construct HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<String> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|source| AppError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| AppError::Network {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;

    /// In-memory transport that serves canned bodies keyed by full URL.
    #[derive(Default)]
    pub struct StaticClient {
        bodies: HashMap<String, std::result::Result<String, StatusCode>>,
        calls: AtomicUsize,
        seen_headers: Mutex<Vec<HeaderMap>>,
    }

    impl StaticClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.bodies.insert(url.into(), Ok(body.into()));
            self
        }

        pub fn with_status(mut self, url: impl Into<String>, status: StatusCode) -> Self {
            self.bodies.insert(url.into(), Err(status));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen_headers(&self) -> Vec<HeaderMap> {
            self.seen_headers
                .lock()
                .map(|seen| seen.clone())
                .unwrap_or_default()
        }
    }

    impl HttpClient for StaticClient {
        async fn get(&self, url: &str, headers: &HeaderMap) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen_headers.lock() {
                seen.push(headers.clone());
            }
            // Let other in-flight requests make progress so completions interleave.
            tokio::task::yield_now().await;

            match self.bodies.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(AppError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(AppError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }
}
