// src/sink/mod.rs
pub mod log;
pub mod webhook;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::feed::types::SeismicRecord;

pub use self::log::LogSink;
pub use webhook::WebhookSink;

/// Telemetry forwarded for every newly accepted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
}

impl From<&SeismicRecord> for TelemetryEvent {
    fn from(r: &SeismicRecord) -> Self {
        Self {
            latitude: r.latitude,
            longitude: r.longitude,
            magnitude: r.magnitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub action: String, // always "notify"
    pub message: String,
}

impl AlertMessage {
    pub fn notify(message: impl Into<String>) -> Self {
        Self {
            action: "notify".to_string(),
            message: message.into(),
        }
    }
}

/// Downstream receiver of accepted records and alerts.
#[async_trait::async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send_event(&self, ev: &TelemetryEvent) -> Result<()>;
    async fn send_alert(&self, alert: &AlertMessage) -> Result<()>;
    fn name(&self) -> &'static str;
}

// --- Test helper ---
#[derive(Default)]
pub struct MemorySink {
    pub events: Mutex<Vec<TelemetryEvent>>,
    pub alerts: Mutex<Vec<AlertMessage>>,
    /// When set, every dispatch fails after being recorded.
    pub fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<AlertMessage> {
        self.alerts.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TelemetrySink for MemorySink {
    async fn send_event(&self, ev: &TelemetryEvent) -> Result<()> {
        if let Ok(mut v) = self.events.lock() {
            v.push(ev.clone());
        }
        if self.fail {
            anyhow::bail!("memory sink configured to fail");
        }
        Ok(())
    }

    async fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        if let Ok(mut v) = self.alerts.lock() {
            v.push(alert.clone());
        }
        if self.fail {
            anyhow::bail!("memory sink configured to fail");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
