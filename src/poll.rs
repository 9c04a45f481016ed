// src/poll.rs
//! The polling worker: fetch → extract → parse/dedup → alert/forward → sleep.

use anyhow::Result;
use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::alert::{AlertDecision, AlertEvaluator};
use crate::config::Settings;
use crate::feed::{
    ensure_metrics_described, DedupTracker, Extractor, FeedSource, FetchError, ParseError,
    RecordParser, SeenState, SeismicRecord,
};
use crate::sink::{AlertMessage, TelemetryEvent, TelemetrySink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Extracting,
    Parsing,
    Evaluating,
    Sleeping,
    Stopped,
}

/// Result of a single cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// New records were found; `alerted` of them crossed the threshold.
    Forwarded { accepted: usize, alerted: usize },
    NoNewData,
    /// The data region was missing from the document.
    NothingFound,
    Retryable(FetchError),
    /// The feed layout changed; the worker must stop.
    Fatal(ParseError),
    Cancelled,
}

pub struct PollLoop {
    source: Box<dyn FeedSource>,
    sink: Arc<dyn TelemetrySink>,
    extractor: Extractor,
    parser: RecordParser,
    tracker: DedupTracker,
    alerts: AlertEvaluator,
    interval: Duration,
    state: PollState,
}

impl PollLoop {
    /// Worker with the default `pre` region, KOERI line pattern, one minute
    /// interval and alerting disabled.
    pub fn new(source: Box<dyn FeedSource>, sink: Arc<dyn TelemetrySink>) -> Result<Self> {
        Ok(Self {
            source,
            sink,
            extractor: Extractor::new("pre")?,
            parser: RecordParser::default(),
            tracker: DedupTracker::new(),
            alerts: AlertEvaluator::new(0.0),
            interval: Duration::from_secs(60),
            state: PollState::Idle,
        })
    }

    pub fn from_settings(
        settings: &Settings,
        source: Box<dyn FeedSource>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Result<Self> {
        Ok(Self::new(source, sink)?
            .with_extractor(Extractor::new(&settings.selector)?)
            .with_parser(RecordParser::new(&settings.pattern)?)
            .with_threshold(settings.alert)
            .with_interval(Duration::from_millis(settings.period_ms)))
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_parser(mut self, parser: RecordParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.alerts = AlertEvaluator::new(threshold);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn seen(&self) -> SeenState {
        self.tracker.state()
    }

    /// Runs one cycle to completion.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycle(&CancellationToken::new()).await
    }

    /// Polls until `cancel` fires or the feed layout changes.
    pub async fn run_forever(&mut self, cancel: CancellationToken) -> Result<(), ParseError> {
        ensure_metrics_described();
        info!(source = self.source.name(), sink = self.sink.name(), "worker started");

        let result = loop {
            if cancel.is_cancelled() {
                break Ok(());
            }
            match self.cycle(&cancel).await {
                CycleOutcome::Cancelled => break Ok(()),
                CycleOutcome::Fatal(e) => break Err(e),
                _ => {}
            }

            // Fixed interval, no escalation after consecutive failures.
            self.state = PollState::Sleeping;
            tokio::select! {
                _ = cancel.cancelled() => break Ok(()),
                _ = tokio::time::sleep(self.interval) => {}
            }
        };

        self.state = PollState::Stopped;
        info!("worker stopped");
        result
    }

    async fn cycle(&mut self, cancel: &CancellationToken) -> CycleOutcome {
        counter!("quake_cycles_total").increment(1);

        self.state = PollState::Fetching;
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return CycleOutcome::Cancelled,
            res = self.source.fetch() => res,
        };
        let doc = match fetched {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, source = self.source.name(), "fetch failed, retrying next cycle");
                return CycleOutcome::Retryable(e);
            }
        };

        self.state = PollState::Extracting;
        let t0 = std::time::Instant::now();
        let lines = match self.extractor.extract(&doc) {
            Ok(lines) => lines,
            Err(e) => {
                debug!(error = %e, "no data region in feed");
                return CycleOutcome::NothingFound;
            }
        };

        // Only lines above the first already-seen record are parsed.
        self.state = PollState::Parsing;
        let mut scan = self.tracker.begin_cycle();
        let mut fresh: Vec<SeismicRecord> = Vec::new();
        for line in &lines {
            let record = match self.parser.parse(line) {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, "data structure might be changed, please check");
                    self.state = PollState::Stopped;
                    return CycleOutcome::Fatal(e);
                }
            };
            if !scan.is_new(&record) {
                break;
            }
            fresh.push(record);
        }
        histogram!("quake_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if fresh.is_empty() {
            info!("no new earthquake");
            scan.commit();
            mark_cycle_completed();
            return CycleOutcome::NoNewData;
        }

        self.state = PollState::Evaluating;
        let mut alerted = 0usize;
        for record in &fresh {
            info!(
                occurred_at = %record.occurred_at,
                magnitude = record.magnitude,
                depth_km = record.depth_km,
                place = %record.place,
                "new earthquake"
            );
            counter!("quake_records_new_total").increment(1);

            if let AlertDecision::Alert { message } = self.alerts.evaluate(record) {
                warn!("{message}");
                counter!("quake_alerts_total").increment(1);
                alerted += 1;
                let alert = AlertMessage::notify(message);
                let sent = tokio::select! {
                    _ = cancel.cancelled() => return CycleOutcome::Cancelled,
                    res = self.sink.send_alert(&alert) => res,
                };
                if let Err(e) = sent {
                    warn!(error = ?e, sink = self.sink.name(), "alert dispatch failed");
                    counter!("quake_sink_errors_total").increment(1);
                }
            }

            let ev = TelemetryEvent::from(record);
            let sent = tokio::select! {
                _ = cancel.cancelled() => return CycleOutcome::Cancelled,
                res = self.sink.send_event(&ev) => res,
            };
            match sent {
                Ok(()) => info!("event data is sent"),
                Err(e) => {
                    warn!(error = ?e, sink = self.sink.name(), "telemetry dispatch failed");
                    counter!("quake_sink_errors_total").increment(1);
                }
            }
        }

        scan.commit();
        mark_cycle_completed();

        CycleOutcome::Forwarded {
            accepted: fresh.len(),
            alerted,
        }
    }
}

/// A cycle completes when it got through dedup, whether or not it found new records.
fn mark_cycle_completed() {
    gauge!("quake_last_cycle_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
}
