//! Environment Classifier
//!
//! Labels the wearer's surroundings from aggregate light/range
//! statistics. Lighting and complexity_level are always rule-derived,
//! even when the label comes from a trained model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::ENVIRONMENT_MODEL;
use crate::fallback;
use crate::features::{self, ENVIRONMENT_LAYOUT};
use crate::registry::ModelRegistry;

use super::{with_model_or, ModelSource};

/// Class-index order the environment artifact is trained against.
pub const ENVIRONMENT_LABELS: &[&str] = &["indoor", "outdoor", "dark_indoor", "complex_indoor"];

/// Fixed confidence reported for model-path labels.
const MODEL_CONFIDENCE: f32 = 0.85;

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentInput {
    pub ambient_light_avg: f32,
    pub ambient_light_variance: f32,
    pub detection_frequency: f32,
    pub average_obstacle_distance: f32,
    pub proximity_pattern_complexity: f32,
    pub distance_variance: f32,
}

impl Default for EnvironmentInput {
    fn default() -> Self {
        Self {
            ambient_light_avg: 500.0,
            ambient_light_variance: 0.0,
            detection_frequency: 0.0,
            average_obstacle_distance: 500.0,
            proximity_pattern_complexity: 0.0,
            distance_variance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lighting {
    Bright,
    Dim,
    Dark,
}

impl Lighting {
    pub fn from_light(ambient_light_avg: f32) -> Self {
        if ambient_light_avg > 700.0 {
            Lighting::Bright
        } else if ambient_light_avg > 300.0 {
            Lighting::Dim
        } else {
            Lighting::Dark
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    High,
    Medium,
    Low,
}

impl ComplexityLevel {
    pub fn from_complexity(complexity: f32) -> Self {
        if complexity > 7.0 {
            ComplexityLevel::High
        } else if complexity > 4.0 {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReading {
    pub environment_type: String,
    pub confidence: f32,
    pub lighting: Lighting,
    pub complexity_level: ComplexityLevel,
    pub model_source: ModelSource,
    pub message: String,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct EnvironmentClassifier {
    registry: Arc<ModelRegistry>,
}

impl EnvironmentClassifier {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn classify(&self, input: &EnvironmentInput) -> EnvironmentReading {
        let features = features::apply_layout(
            &ENVIRONMENT_LAYOUT,
            &[
                input.ambient_light_avg,
                input.ambient_light_variance,
                input.detection_frequency,
                input.average_obstacle_distance,
                input.proximity_pattern_complexity,
                input.distance_variance,
            ],
        );
        let light_avg = features[0];
        let avg_dist = features[3];
        let complexity = features[4];

        let ((label, confidence), model_source) = with_model_or(
            &self.registry,
            ENVIRONMENT_MODEL,
            |bundle| {
                let prepared = bundle.prepare(&features)?;
                let class = bundle.estimator().predict_class(&prepared)?;
                let label = ENVIRONMENT_LABELS.get(class).copied().ok_or_else(|| {
                    crate::error::InferenceError::OutputShape(format!(
                        "environment class {} out of range",
                        class
                    ))
                })?;
                Ok((label, MODEL_CONFIDENCE))
            },
            || fallback::environment_rules(light_avg, avg_dist, complexity),
        );

        // Always rule-based, independent of the label's provenance
        let lighting = Lighting::from_light(light_avg);
        let complexity_level = ComplexityLevel::from_complexity(complexity);

        EnvironmentReading {
            environment_type: label.to_string(),
            confidence,
            lighting,
            complexity_level,
            model_source,
            message: format!("{} ({:?} light, {:?} complexity)", label, lighting, complexity_level),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
