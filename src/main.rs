//! quake-watch — binary entrypoint.
//! Loads settings, wires the HTTP fetcher and telemetry sink, and runs the
//! poll loop until Ctrl-C or a feed layout change.

use anyhow::Context;
use quake_watch::feed::HttpFetcher;
use quake_watch::sink::{LogSink, TelemetrySink, WebhookSink};
use quake_watch::{config, PollLoop};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; JSON lines when QUAKE_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quake_watch=info,telemetry=info,warn"));

    let json = std::env::var("QUAKE_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = config::load_default().context("loading settings")?;
    settings.validate().context("invalid settings")?;

    if let Some(addr) = settings.metrics_addr {
        quake_watch::metrics::install(addr)?;
    }

    let source = HttpFetcher::new(settings.url.clone()).with_timeout(settings.request_timeout_secs);
    let sink: Arc<dyn TelemetrySink> = match &settings.sink.endpoint {
        Some(endpoint) => Arc::new(
            WebhookSink::new(endpoint.clone())
                .with_timeout(settings.request_timeout_secs)
                .with_device_id(settings.sink.device_id.clone()),
        ),
        None => Arc::new(LogSink),
    };

    tracing::info!(
        url = %settings.url,
        period_ms = settings.period_ms,
        alert = settings.alert,
        sink = sink.name(),
        "settings loaded"
    );

    let mut worker = PollLoop::from_settings(&settings, Box::new(source), sink)?;

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run_forever(cancel).await }
    });

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
            Err(e) => tracing::warn!(error = ?e, "cannot listen for Ctrl-C"),
        }
    });

    let outcome = task.await.context("poll loop task panicked")?;
    cancel.cancel();
    outcome.context("feed layout changed, stopping service")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "quake-watch exited with error");
            ExitCode::FAILURE
        }
    }
}
