//! Danger Scorer
//!
//! Scores how dangerous the nearest object is on a 0-100 scale and maps
//! the score to a recommended action. The per-object risk multiplier is
//! applied to the model's raw output (it is NOT a training feature), so
//! the risk table can change without retraining.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::DANGER_MODEL;
use crate::fallback;
use crate::features::{self, DANGER_LAYOUT};
use crate::registry::ModelRegistry;

use super::{with_model_or, ModelSource};

// ============================================================================
// RISK TABLE
// ============================================================================

/// Risk multiplier per semantic object type. Unknown types score like
/// an inert obstacle.
pub fn risk_multiplier(object_type: &str) -> f32 {
    match object_type {
        "person" => 1.5,
        "vehicle" => 1.4,
        "stairs" => 1.3,
        "animal" => 1.2,
        "door" | "obstacle" => 1.0,
        _ => 1.0,
    }
}

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DangerInput {
    pub distance_cm: f32,
    /// cm/s, negative = approaching. Intentionally never clamped.
    pub rate_of_change: f32,
    /// m/s wearer speed estimate
    pub current_speed_estimate: f32,
    pub proximity_value: f32,
    pub object_type: String,
}

impl Default for DangerInput {
    fn default() -> Self {
        Self {
            distance_cm: 1000.0,
            rate_of_change: 0.0,
            current_speed_estimate: 0.0,
            proximity_value: 0.0,
            object_type: "obstacle".to_string(),
        }
    }
}

/// User-facing safety contract: strict step function of the clipped
/// score with boundaries at 30/60/80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Stop,
    SlowDown,
    Caution,
    Safe,
}

impl RecommendedAction {
    pub fn from_score(score: f32) -> Self {
        if score > 80.0 {
            RecommendedAction::Stop
        } else if score > 60.0 {
            RecommendedAction::SlowDown
        } else if score > 30.0 {
            RecommendedAction::Caution
        } else {
            RecommendedAction::Safe
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DangerAssessment {
    pub danger_score: f32,
    pub recommended_action: RecommendedAction,
    /// Seconds until contact, when an approach rate or speed gives one
    pub time_to_collision: Option<f32>,
    pub risk_multiplier: f32,
    pub model_source: ModelSource,
    pub message: String,
}

// ============================================================================
// SCORER
// ============================================================================

pub struct DangerScorer {
    registry: Arc<ModelRegistry>,
}

impl DangerScorer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn assess(&self, input: &DangerInput) -> DangerAssessment {
        let mult = risk_multiplier(&input.object_type);

        let features = features::apply_layout(
            &DANGER_LAYOUT,
            &[
                input.distance_cm,
                input.rate_of_change,
                input.proximity_value,
                input.current_speed_estimate,
            ],
        );
        let distance = features[0];
        let rate = features[1];
        let speed = features[3];

        let (score, model_source) = with_model_or(
            &self.registry,
            DANGER_MODEL,
            |bundle| {
                let prepared = bundle.prepare(&features)?;
                let raw = bundle.estimator().predict(&prepared)?;
                Ok((raw * mult).clamp(0.0, 100.0))
            },
            || fallback::danger_rules(distance, rate, mult),
        );
        let score = score.clamp(0.0, 100.0);

        let time_to_collision = if rate < -1.0 {
            Some(distance / rate.abs())
        } else if speed > 0.0 {
            // m/s -> cm/s
            Some(distance / (speed * 100.0))
        } else {
            None
        };

        let recommended_action = RecommendedAction::from_score(score);
        let message = format!(
            "danger {:.1}/100 for {} at {:.0}cm ({:?})",
            score, input.object_type, distance, recommended_action
        );

        DangerAssessment {
            danger_score: score,
            recommended_action,
            time_to_collision,
            risk_multiplier: mult,
            model_source,
            message,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
