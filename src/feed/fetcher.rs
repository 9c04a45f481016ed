// src/feed/fetcher.rs
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::feed::types::FeedSource;

/// Every fetch failure is retryable: the caller skips the cycle and
/// tries again after the normal interval.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed returned HTTP {0}")]
    Status(StatusCode),
    #[error("feed returned an empty body")]
    EmptyBody,
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct HttpFetcher {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn transport_failed(&self, e: &reqwest::Error) {
        tracing::warn!(error = ?e, url = %self.url, "feed http error");
        counter!("quake_fetch_errors_total").increment(1);
    }
}

#[async_trait]
impl FeedSource for HttpFetcher {
    async fn fetch(&self) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .inspect_err(|e| self.transport_failed(e))?;

        let status = resp.status();
        if !status.is_success() {
            counter!("quake_fetch_errors_total").increment(1);
            return Err(FetchError::Status(status));
        }

        let body = resp.text().await.inspect_err(|e| self.transport_failed(e))?;
        if body.trim().is_empty() {
            counter!("quake_fetch_errors_total").increment(1);
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
