//! HazardAdvisor - process-level entry point
//!
//! Owns the registry and one instance of each predictor. The transport
//! layer constructs this once at startup and calls it from any number
//! of request handler threads; everything below is request-scoped
//! except the read-through model cache.

use std::path::PathBuf;
use std::sync::Arc;

use crate::detector::{FrameRequest, FrameResponse, ObjectDetector};
use crate::predictors::{
    AnomalyInput, AnomalyReport, AnomalyScorer, DangerAssessment, DangerInput, DangerScorer,
    EnvironmentClassifier, EnvironmentInput, EnvironmentReading, ObjectInput, ObjectPredictor,
    ObjectPresence,
};
use crate::registry::{BundleInfo, ModelRegistry};

pub struct HazardAdvisor {
    registry: Arc<ModelRegistry>,
    danger: DangerScorer,
    anomaly: AnomalyScorer,
    environment: EnvironmentClassifier,
    object: ObjectPredictor,
    detector: ObjectDetector,
}

impl HazardAdvisor {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        let registry = Arc::new(ModelRegistry::new(model_dir));
        Self::with_registry(registry)
    }

    /// Model directory from `HAZARD_MODEL_DIR` or the built-in default.
    pub fn from_env() -> Self {
        Self::with_registry(Arc::new(ModelRegistry::from_env()))
    }

    pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
        Self {
            danger: DangerScorer::new(registry.clone()),
            anomaly: AnomalyScorer::new(registry.clone()),
            environment: EnvironmentClassifier::new(registry.clone()),
            object: ObjectPredictor::new(registry.clone()),
            detector: ObjectDetector::new(registry.clone()),
            registry,
        }
    }

    pub fn assess_danger(&self, input: &DangerInput) -> DangerAssessment {
        self.danger.assess(input)
    }

    pub fn check_device(&self, input: &AnomalyInput) -> AnomalyReport {
        self.anomaly.check(input)
    }

    pub fn classify_environment(&self, input: &EnvironmentInput) -> EnvironmentReading {
        self.environment.classify(input)
    }

    pub fn identify_object(&self, input: &ObjectInput) -> ObjectPresence {
        self.object.identify(input)
    }

    pub fn detect_frame(&self, request: &FrameRequest) -> FrameResponse {
        self.detector.detect(request)
    }

    /// Loaded-artifact diagnostics.
    pub fn model_status(&self) -> Vec<BundleInfo> {
        self.registry.status()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictors::{ModelSource, RecommendedAction, Severity};

    fn advisor() -> (tempfile::TempDir, HazardAdvisor) {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let advisor = HazardAdvisor::new(dir.path());
        (dir, advisor)
    }

    #[test]
    fn test_all_judgments_work_without_artifacts() {
        let (_dir, advisor) = advisor();

        let danger = advisor.assess_danger(&DangerInput {
            distance_cm: 25.0,
            rate_of_change: -35.0,
            object_type: "person".to_string(),
            ..Default::default()
        });
        assert_eq!(danger.danger_score, 100.0);
        assert_eq!(danger.recommended_action, RecommendedAction::Stop);
        assert_eq!(danger.model_source, ModelSource::Fallback);

        let report = advisor.check_device(&AnomalyInput {
            temperature_c: 90.0,
            battery_level: 5.0,
            cpu_usage: 97.0,
            error_count: 15.0,
            ..Default::default()
        });
        assert!(report.is_anomaly);
        assert_eq!(report.severity, Severity::Critical);

        let env = advisor.classify_environment(&EnvironmentInput::default());
        assert_eq!(env.model_source, ModelSource::Fallback);

        let object = advisor.identify_object(&ObjectInput {
            distance_cm: 30.0,
            ..Default::default()
        });
        assert!(object.object_detected);

        assert!(advisor.model_status().is_empty());
    }

    #[test]
    fn test_concurrent_requests() {
        let dir = tempfile::tempdir().unwrap();
        let advisor = std::sync::Arc::new(HazardAdvisor::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let a = advisor.clone();
                std::thread::spawn(move || {
                    let result = a.assess_danger(&DangerInput {
                        distance_cm: 50.0 * (i as f32 + 1.0),
                        ..Default::default()
                    });
                    assert!((0.0..=100.0).contains(&result.danger_score));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
