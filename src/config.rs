// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::feed::parser::{RecordParser, DEFAULT_PATTERN};
use crate::feed::Extractor;

pub const ENV_CONFIG_PATH: &str = "QUAKE_CONFIG_PATH";

pub const DEFAULT_URL: &str = "http://www.koeri.boun.edu.tr/scripts/lst0.asp";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub url: String,
    /// CSS selector of the element holding the event list.
    pub selector: String,
    pub pattern: String,
    pub period_ms: u64,
    /// Magnitude threshold; 0 disables alerting.
    pub alert: f64,
    pub request_timeout_secs: u64,
    pub sink: SinkSettings,
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    pub endpoint: Option<String>,
    pub device_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            selector: "pre".to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            period_ms: 60_000,
            alert: 0.0,
            request_timeout_secs: 30,
            sink: SinkSettings::default(),
            metrics_addr: None,
        }
    }
}

impl Settings {
    /// Rejects anything the poll loop could only discover at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            bail!("period_ms must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if !self.alert.is_finite() {
            bail!("alert threshold must be a finite number");
        }
        if self.url.trim().is_empty() {
            bail!("url must not be empty");
        }
        Extractor::new(&self.selector)?;
        RecordParser::new(&self.pattern)?;
        Ok(())
    }

    /// Overrides from `QUAKE_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|k| std::env::var(k).ok())
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = get("QUAKE_URL") {
            self.url = v;
        }
        if let Some(v) = get("QUAKE_SELECTOR") {
            self.selector = v;
        }
        if let Some(v) = get("QUAKE_PATTERN") {
            self.pattern = v;
        }
        if let Some(v) = get("QUAKE_PERIOD_MS") {
            self.period_ms = v
                .trim()
                .parse()
                .with_context(|| format!("QUAKE_PERIOD_MS={v:?}"))?;
        }
        if let Some(v) = get("QUAKE_ALERT") {
            self.alert = v
                .trim()
                .parse()
                .with_context(|| format!("QUAKE_ALERT={v:?}"))?;
        }
        if let Some(v) = get("QUAKE_SINK_ENDPOINT") {
            self.sink.endpoint = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = get("QUAKE_DEVICE_ID") {
            self.sink.device_id = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = get("QUAKE_METRICS_ADDR") {
            self.metrics_addr = Some(
                v.trim()
                    .parse()
                    .with_context(|| format!("QUAKE_METRICS_ADDR={v:?}"))?,
            );
        }
        Ok(())
    }
}

/// Load settings from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_settings(&content, ext.as_str())
        .with_context(|| format!("parsing settings from {}", path.display()))
}

/// Load settings using env var + fallbacks, then apply env overrides:
/// 1) $QUAKE_CONFIG_PATH
/// 2) config/quake.toml
/// 3) config/quake.json
/// 4) built-in defaults
pub fn load_default() -> Result<Settings> {
    let mut settings = load_file_default()?;
    settings.apply_env()?;
    Ok(settings)
}

fn load_file_default() -> Result<Settings> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/quake.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/quake.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(Settings::default())
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<Settings> {
    let looks_json = s.trim_start().starts_with('{');
    if hint_ext == "json" || (hint_ext != "toml" && looks_json) {
        return serde_json::from_str(s).context("invalid JSON settings");
    }
    toml::from_str(s).context("invalid TOML settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_and_json_fill_missing_fields_with_defaults() {
        let t = parse_settings(
            r#"
alert = 4.5
period_ms = 1000

[sink]
device_id = "quake-01"
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(t.alert, 4.5);
        assert_eq!(t.period_ms, 1000);
        assert_eq!(t.sink.device_id.as_deref(), Some("quake-01"));
        assert_eq!(t.url, DEFAULT_URL);
        assert_eq!(t.selector, "pre");

        let j = parse_settings(r#"{"selector": "div#list", "alert": 3}"#, "").unwrap();
        assert_eq!(j.selector, "div#list");
        assert_eq!(j.alert, 3.0);
        assert_eq!(j.pattern, DEFAULT_PATTERN);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            ("QUAKE_ALERT", "5"),
            ("QUAKE_PERIOD_MS", " 2500 "),
            ("QUAKE_SINK_ENDPOINT", "http://sink.test/ingest"),
            ("QUAKE_DEVICE_ID", ""),
            ("QUAKE_METRICS_ADDR", "127.0.0.1:9100"),
        ]
        .into_iter()
        .collect();
        let mut s = Settings::default();
        s.apply_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.alert, 5.0);
        assert_eq!(s.period_ms, 2500);
        assert_eq!(s.sink.endpoint.as_deref(), Some("http://sink.test/ingest"));
        assert_eq!(s.sink.device_id, None);
        assert_eq!(s.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
    }

    #[test]
    fn unparsable_override_is_an_error() {
        let mut s = Settings::default();
        let res = s.apply_vars(|k| (k == "QUAKE_ALERT").then(|| "five".to_string()));
        assert!(res.is_err());
    }

    #[test]
    fn validate_catches_bad_values() {
        assert!(Settings::default().validate().is_ok());

        let zero = Settings {
            period_ms: 0,
            ..Settings::default()
        };
        assert!(zero.validate().is_err());

        let no_timeout = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(no_timeout.validate().is_err());

        let nan = Settings {
            alert: f64::NAN,
            ..Settings::default()
        };
        assert!(nan.validate().is_err());

        let few_groups = Settings {
            pattern: r"^(\S+)$".into(),
            ..Settings::default()
        };
        assert!(few_groups.validate().is_err());

        let bad_selector = Settings {
            selector: "pre[[".into(),
            ..Settings::default()
        };
        assert!(bad_selector.validate().is_err());
    }
}
