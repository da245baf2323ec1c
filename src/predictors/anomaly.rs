//! Anomaly Scorer - device self-diagnosis
//!
//! Wraps an isolation-style estimator whose continuous score is a
//! negative log-likelihood-like quantity (more negative = more
//! anomalous). The score is calibrated to [0,1] and confidence is the
//! distance from the 0.5 decision midpoint: scores near the ambiguous
//! center are low-confidence regardless of direction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::ANOMALY_MODEL;
use crate::fallback;
use crate::features::{self, ANOMALY_LAYOUT};
use crate::registry::ModelRegistry;

use super::{with_model_or, ModelSource};

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnomalyInput {
    pub temperature_c: f32,
    pub battery_level: f32,
    pub cpu_usage: f32,
    pub error_count: f32,
    pub rssi: f32,
}

impl Default for AnomalyInput {
    fn default() -> Self {
        Self {
            temperature_c: 25.0,
            battery_level: 100.0,
            cpu_usage: 0.0,
            error_count: 0.0,
            rssi: -60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_score(score: f32) -> Self {
        if score > 0.8 {
            Severity::Critical
        } else if score > 0.6 {
            Severity::High
        } else if score > 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyReport {
    pub anomaly_score: f32,
    pub is_anomaly: bool,
    pub severity: Severity,
    pub confidence: f32,
    /// 100 = perfectly healthy, 0 = fully anomalous
    pub device_health: f32,
    pub model_source: ModelSource,
    pub message: String,
}

// ============================================================================
// SCORER
// ============================================================================

/// Rule-based confidence is not calibrated; reported as a constant floor.
const FALLBACK_CONFIDENCE: f32 = 0.6;

pub struct AnomalyScorer {
    registry: Arc<ModelRegistry>,
}

impl AnomalyScorer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn check(&self, input: &AnomalyInput) -> AnomalyReport {
        let features = features::apply_layout(
            &ANOMALY_LAYOUT,
            &[
                input.temperature_c,
                input.battery_level,
                input.cpu_usage,
                input.error_count,
                input.rssi,
            ],
        );

        let ((score, is_anomaly, confidence), model_source) = with_model_or(
            &self.registry,
            ANOMALY_MODEL,
            |bundle| {
                let prepared = bundle.prepare(&features)?;
                let (flag, raw) = bundle.estimator().outlier(&prepared)?;
                let score = (0.5 - raw).clamp(0.0, 1.0);
                let confidence = ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0);
                Ok((score, flag, confidence))
            },
            || {
                let (score, flagged) = fallback::anomaly_rules(
                    features[0],
                    features[1],
                    features[2],
                    features[3],
                );
                (score, flagged, FALLBACK_CONFIDENCE)
            },
        );

        let severity = Severity::from_score(score);
        let device_health = 100.0 - score * 100.0;
        let message = if is_anomaly {
            format!("device anomaly {:.2} ({:?} severity)", score, severity)
        } else {
            format!("device nominal, health {:.0}/100", device_health)
        };

        AnomalyReport {
            anomaly_score: score,
            is_anomaly,
            severity,
            confidence,
            device_health,
            model_source,
            message,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> (tempfile::TempDir, AnomalyScorer) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::new(dir.path()));
        (dir, AnomalyScorer::new(registry))
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(Severity::from_score(0.81), Severity::Critical);
        assert_eq!(Severity::from_score(0.8), Severity::High);
        assert_eq!(Severity::from_score(0.61), Severity::High);
        assert_eq!(Severity::from_score(0.6), Severity::Medium);
        assert_eq!(Severity::from_score(0.41), Severity::Medium);
        assert_eq!(Severity::from_score(0.4), Severity::Low);
        assert_eq!(Severity::from_score(0.0), Severity::Low);
    }

    #[test]
    fn test_overheating_drained_device_is_critical() {
        let (_dir, scorer) = scorer();
        let report = scorer.check(&AnomalyInput {
            temperature_c: 90.0,
            battery_level: 5.0,
            cpu_usage: 97.0,
            error_count: 15.0,
            ..Default::default()
        });
        assert_eq!(report.anomaly_score, 1.0);
        assert!(report.is_anomaly);
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.device_health, 0.0);
        assert_eq!(report.model_source, ModelSource::Fallback);
        assert_eq!(report.confidence, 0.6);
    }

    #[test]
    fn test_healthy_device() {
        let (_dir, scorer) = scorer();
        let report = scorer.check(&AnomalyInput::default());
        assert_eq!(report.anomaly_score, 0.0);
        assert!(!report.is_anomaly);
        assert_eq!(report.severity, Severity::Low);
        assert_eq!(report.device_health, 100.0);
    }

    #[test]
    fn test_score_and_confidence_bounded() {
        let (_dir, scorer) = scorer();
        for temp in [0.0, 75.0, 200.0] {
            for battery in [-10.0, 15.0, 100.0] {
                let report = scorer.check(&AnomalyInput {
                    temperature_c: temp,
                    battery_level: battery,
                    cpu_usage: 99.0,
                    error_count: 7.0,
                    ..Default::default()
                });
                assert!((0.0..=1.0).contains(&report.anomaly_score));
                assert!((0.0..=1.0).contains(&report.confidence));
            }
        }
    }

    #[test]
    fn test_out_of_range_inputs_clamped_not_rejected() {
        let (_dir, scorer) = scorer();
        // temperature 300 clamps to 150 (>80 -> 2 issues)
        let report = scorer.check(&AnomalyInput {
            temperature_c: 300.0,
            ..Default::default()
        });
        assert!(report.anomaly_score > 0.0);
    }

    #[test]
    fn test_model_path_calibration_formula() {
        // raw -0.3 (anomalous side): score = 0.5 - (-0.3) = 0.8
        let score = (0.5f32 - (-0.3)).clamp(0.0, 1.0);
        assert!((score - 0.8).abs() < 1e-6);
        let confidence = ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0);
        assert!((confidence - 0.6).abs() < 1e-6);

        // raw near the midpoint is ambiguous: low confidence
        let score = (0.5f32 - 0.02).clamp(0.0, 1.0);
        let confidence = ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0);
        assert!(confidence < 0.1);
    }
}
