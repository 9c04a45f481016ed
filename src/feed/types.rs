// src/feed/types.rs
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::feed::fetcher::FetchError;

/// One parsed seismic event. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeismicRecord {
    pub occurred_at: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    pub place: String,
}

impl SeismicRecord {
    /// Two records describe the same event iff their date+time match exactly.
    pub fn identity(&self) -> NaiveDateTime {
        self.occurred_at
    }
}

/// Where the raw feed document comes from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
    fn name(&self) -> &'static str;
}
