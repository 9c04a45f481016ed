use anyhow::Result;

use super::{AlertMessage, TelemetryEvent, TelemetrySink};

/// Sink used when no endpoint is configured: everything goes to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait::async_trait]
impl TelemetrySink for LogSink {
    async fn send_event(&self, ev: &TelemetryEvent) -> Result<()> {
        tracing::info!(
            target: "telemetry",
            latitude = ev.latitude,
            longitude = ev.longitude,
            magnitude = ev.magnitude,
            "telemetry event"
        );
        Ok(())
    }

    async fn send_alert(&self, alert: &AlertMessage) -> Result<()> {
        tracing::info!(target: "telemetry", action = %alert.action, "{}", alert.message);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
