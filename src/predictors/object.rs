//! Object Predictor (scalar path)
//!
//! Judges whether something is present from range/proximity/light
//! readings plus the camera's last detection confidence. The camera
//! frame pipeline in `detector/` is the richer sibling; this predictor
//! works when no frame is available.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::OBJECT_MODEL;
use crate::fallback;
use crate::features::{self, OBJECT_LAYOUT};
use crate::registry::ModelRegistry;

use super::{with_model_or, ModelSource};

/// Class-index order the object artifact is trained against.
pub const OBJECT_CLASS_LABELS: &[&str] =
    &["none", "obstacle", "person", "vehicle", "stairs", "animal", "door"];

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObjectInput {
    pub distance_cm: f32,
    pub detection_confidence: f32,
    pub proximity_value: f32,
    pub ambient_light: f32,
}

impl Default for ObjectInput {
    fn default() -> Self {
        Self {
            distance_cm: 1000.0,
            detection_confidence: 0.0,
            proximity_value: 0.0,
            ambient_light: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectPresence {
    pub object_detected: bool,
    pub object_type: String,
    pub confidence: f32,
    pub model_source: ModelSource,
    pub message: String,
}

// ============================================================================
// PREDICTOR
// ============================================================================

pub struct ObjectPredictor {
    registry: Arc<ModelRegistry>,
}

impl ObjectPredictor {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn identify(&self, input: &ObjectInput) -> ObjectPresence {
        let features = features::apply_layout(
            &OBJECT_LAYOUT,
            &[
                input.distance_cm,
                input.detection_confidence,
                input.proximity_value,
                input.ambient_light,
            ],
        );
        let distance = features[0];
        let detection_confidence = features[1];
        let proximity = features[2];

        let ((label, confidence, detected), model_source) = with_model_or(
            &self.registry,
            OBJECT_MODEL,
            |bundle| {
                let prepared = bundle.prepare(&features)?;
                let class = bundle.estimator().predict_class(&prepared)?;
                let label = OBJECT_CLASS_LABELS.get(class).copied().ok_or_else(|| {
                    crate::error::InferenceError::OutputShape(format!(
                        "object class {} out of range",
                        class
                    ))
                })?;
                Ok((label, detection_confidence, label != "none"))
            },
            || fallback::object_rules(distance, proximity, detection_confidence),
        );

        let message = if detected {
            format!("{} present at {:.0}cm ({:.2})", label, distance, confidence)
        } else {
            "no object present".to_string()
        };

        ObjectPresence {
            object_detected: detected,
            object_type: label.to_string(),
            confidence,
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

    fn predictor() -> (tempfile::TempDir, ObjectPredictor) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::new(dir.path()));
        (dir, ObjectPredictor::new(registry))
    }

    #[test]
    fn test_close_range_presence() {
        let (_dir, predictor) = predictor();
        let result = predictor.identify(&ObjectInput {
            distance_cm: 40.0,
            ..Default::default()
        });
        assert!(result.object_detected);
        assert_eq!(result.object_type, "obstacle");
        assert_eq!(result.model_source, ModelSource::Fallback);
    }

    #[test]
    fn test_clear_path() {
        let (_dir, predictor) = predictor();
        let result = predictor.identify(&ObjectInput::default());
        assert!(!result.object_detected);
        assert_eq!(result.object_type, "none");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_camera_confidence_carries_presence() {
        let (_dir, predictor) = predictor();
        let result = predictor.identify(&ObjectInput {
            distance_cm: 150.0,
            detection_confidence: 0.9,
            ..Default::default()
        });
        assert!(result.object_detected);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_out_of_range_proximity_clamped() {
        let (_dir, predictor) = predictor();
        // 80000 clamps to 65535, still above the presence threshold
        let result = predictor.identify(&ObjectInput {
            proximity_value: 80000.0,
            ..Default::default()
        });
        assert!(result.object_detected);
    }
}
