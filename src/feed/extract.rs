// src/feed/extract.rs
use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use thiserror::Error;

/// Start of the column ruler that separates the column labels from the data.
pub const DATA_MARKER: &str = "-------";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no element matches selector `{0}`")]
    NotFound(String),
    #[error("data marker not found in selected region")]
    MarkerMissing,
}

/// Locates the data block in the fetched page and cuts it into candidate lines.
#[derive(Debug, Clone)]
pub struct Extractor {
    raw_selector: String,
    selector: Selector,
}

impl Extractor {
    pub fn new(selector: &str) -> Result<Self> {
        let parsed =
            Selector::parse(selector).map_err(|e| anyhow!("invalid selector `{selector}`: {e}"))?;
        Ok(Self {
            raw_selector: selector.to_string(),
            selector: parsed,
        })
    }

    /// Text of the first element matching the selector.
    pub fn region_text(&self, doc: &str) -> Result<String, ExtractError> {
        let html = Html::parse_document(doc);
        html.select(&self.selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| ExtractError::NotFound(self.raw_selector.clone()))
    }

    /// Candidate record lines, newest first as the feed lists them.
    pub fn extract(&self, doc: &str) -> Result<Vec<String>, ExtractError> {
        let text = self.region_text(doc)?;
        data_lines(&text)
    }
}

/// Drops everything before the marker, blank lines and the marker line itself.
pub fn data_lines(region: &str) -> Result<Vec<String>, ExtractError> {
    let start = region.find(DATA_MARKER).ok_or(ExtractError::MarkerMissing)?;
    Ok(region[start..]
        .lines()
        .filter(|l| !l.trim().is_empty())
        .skip(1)
        .map(str::to_string)
        .collect())
}
