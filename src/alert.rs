// src/alert.rs
use crate::feed::types::SeismicRecord;

/// Outcome of comparing one record against the configured threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    /// Threshold is 0, alerting is switched off.
    Disabled,
    Below,
    Alert { message: String },
}

impl AlertDecision {
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertDecision::Alert { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlertEvaluator {
    threshold: f64,
}

impl AlertEvaluator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, record: &SeismicRecord) -> AlertDecision {
        evaluate(record, self.threshold)
    }
}

pub fn evaluate(record: &SeismicRecord, threshold: f64) -> AlertDecision {
    if threshold == 0.0 {
        return AlertDecision::Disabled;
    }
    if record.magnitude >= threshold {
        AlertDecision::Alert {
            message: format!(
                "!!!WARNING!!! EARTHQUAKE - {} at {}",
                record.magnitude, record.place
            ),
        }
    } else {
        AlertDecision::Below
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(magnitude: f64) -> SeismicRecord {
        SeismicRecord {
            occurred_at: NaiveDate::from_ymd_opt(2019, 9, 27)
                .unwrap()
                .and_hms_opt(16, 35, 47)
                .unwrap(),
            latitude: 40.4215,
            longitude: 26.091,
            depth_km: 11.7,
            magnitude,
            place: "SAROS KORFEZI(EGE DENIZI)".into(),
        }
    }

    #[test]
    fn zero_threshold_never_alerts() {
        for m in [-1.0, 0.0, 4.1, 9.9, 1e6] {
            assert_eq!(evaluate(&rec(m), 0.0), AlertDecision::Disabled);
        }
    }

    #[test]
    fn below_threshold_does_not_alert() {
        assert_eq!(evaluate(&rec(4.1), 5.0), AlertDecision::Below);
    }

    #[test]
    fn above_threshold_alerts_with_magnitude_and_place() {
        let d = AlertEvaluator::new(4.0).evaluate(&rec(4.1));
        match d {
            AlertDecision::Alert { message } => {
                assert!(message.contains("4.1"));
                assert!(message.contains("SAROS KORFEZI(EGE DENIZI)"));
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn equal_to_threshold_alerts() {
        assert!(evaluate(&rec(5.0), 5.0).is_alert());
    }
}
