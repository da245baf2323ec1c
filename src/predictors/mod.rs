//! Predictors - Danger / Anomaly / Environment / Object (scalar)
//!
//! Each predictor wraps the same flow: build clamped features, look up
//! the artifact, attempt the model path, map any failure to the rule
//! fallback, post-process, assemble a result with provenance. The flow
//! lives in one helper so the fallback contract is applied uniformly.

mod anomaly;
mod danger;
mod environment;
mod object;

pub use anomaly::{AnomalyInput, AnomalyReport, AnomalyScorer, Severity};
pub use danger::{DangerAssessment, DangerInput, DangerScorer, RecommendedAction};
pub use environment::{
    ComplexityLevel, EnvironmentClassifier, EnvironmentInput, EnvironmentReading, Lighting,
};
pub use object::{ObjectInput, ObjectPredictor, ObjectPresence};

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::registry::{ModelBundle, ModelRegistry};

/// Where a result came from. `Fallback` signals reduced confidence to
/// the caller, never an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    MlModel,
    Fallback,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::MlModel => "ml_model",
            ModelSource::Fallback => "fallback",
        }
    }
}

/// Attempt the model path for `name`, falling back on a missing bundle
/// or any inference failure. Both outcomes carry provenance.
pub(crate) fn with_model_or<T>(
    registry: &ModelRegistry,
    name: &str,
    model_path: impl FnOnce(&ModelBundle) -> Result<T, InferenceError>,
    fallback: impl FnOnce() -> T,
) -> (T, ModelSource) {
    match registry.get(name) {
        Some(bundle) => match model_path(&bundle) {
            Ok(value) => (value, ModelSource::MlModel),
            Err(e) => {
                log::warn!("{} inference failed ({}), using fallback", name, e);
                (fallback(), ModelSource::Fallback)
            }
        },
        None => {
            log::debug!("{} unavailable, using fallback", name);
            (fallback(), ModelSource::Fallback)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_model_source_wire_format() {
        assert_eq!(
            serde_json::to_string(&ModelSource::MlModel).unwrap(),
            "\"ml_model\""
        );
        assert_eq!(
            serde_json::to_string(&ModelSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    #[test]
    fn test_with_model_or_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::new(dir.path()));
        let (value, source) = with_model_or(
            &registry,
            "danger_model",
            |_| Ok::<f32, InferenceError>(1.0),
            || 42.0,
        );
        assert_eq!(value, 42.0);
        assert_eq!(source, ModelSource::Fallback);
    }
}
