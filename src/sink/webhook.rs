use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{AlertMessage, TelemetryEvent, TelemetrySink};

/// POSTs telemetry and alerts as JSON to a single endpoint.
#[derive(Clone)]
pub struct WebhookSink {
    endpoint: String,
    device_id: Option<String>,
    client: Client,
    timeout: Duration,
}

impl WebhookSink {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            device_id: None,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sent as `x-device-id` on every request.
    pub fn with_device_id(mut self, id: Option<String>) -> Self {
        self.device_id = id;
        self
    }

    async fn post<T: Serialize + Sync>(&self, body: &T, what: &str) -> Result<()> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(body);
        if let Some(id) = &self.device_id {
            req = req.header("x-device-id", id.as_str());
        }
        req.send()
            .await
            .with_context(|| format!("{what} post"))?
            .error_for_status()
            .with_context(|| format!("{what} non-2xx"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TelemetrySink for WebhookSink {
    async fn send_event(&self, ev: &TelemetryEvent) -> Result<()> {
        self.post(ev, "telemetry").await
    }

    async fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        self.post(alert, "alert").await
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
