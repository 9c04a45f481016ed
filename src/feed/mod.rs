// src/feed/mod.rs
pub mod dedup;
pub mod extract;
pub mod fetcher;
pub mod parser;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use dedup::{DedupTracker, SeenState};
pub use extract::{ExtractError, Extractor};
pub use fetcher::{FetchError, HttpFetcher};
pub use parser::{ParseError, RecordParser};
pub use types::{FeedSource, SeismicRecord};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("quake_cycles_total", "Poll cycles started.");
        describe_counter!(
            "quake_fetch_errors_total",
            "Feed fetches that failed and were retried next cycle."
        );
        describe_counter!("quake_records_new_total", "Records accepted as new.");
        describe_counter!("quake_alerts_total", "Threshold alerts raised.");
        describe_counter!(
            "quake_sink_errors_total",
            "Telemetry or alert dispatches that failed."
        );
        describe_histogram!("quake_parse_ms", "Extract + parse time in milliseconds.");
        describe_gauge!("quake_last_cycle_ts", "Unix ts of the last completed cycle.");
    });
}
