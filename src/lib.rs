// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod alert;
pub mod config;
pub mod feed;
pub mod metrics;
pub mod poll;
pub mod sink;

pub use crate::alert::{AlertDecision, AlertEvaluator};
pub use crate::config::Settings;
pub use crate::feed::{SeenState, SeismicRecord};
pub use crate::poll::{CycleOutcome, PollLoop, PollState};
pub use crate::sink::{AlertMessage, TelemetryEvent, TelemetrySink};
