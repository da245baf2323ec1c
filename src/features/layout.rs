//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema per predictor.**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment LAYOUT_VERSION
//! 2. Change order → increment LAYOUT_VERSION
//! 3. Change a clamp range → increment LAYOUT_VERSION
//!
//! Artifacts are trained against a specific layout; the version + hash
//! make a mismatch detectable instead of silently producing garbage.

use crc32fast::Hasher;

/// Current feature layout version, shared by all predictors.
/// MUST be incremented when any layout below changes.
pub const LAYOUT_VERSION: u8 = 1;

/// One named feature slot with its physical clamp range.
///
/// `range: None` means the feature is intentionally unclamped -
/// for `rate_of_change` both sign and magnitude carry approach-velocity
/// information and bounding it would destroy signal.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub range: Option<(f32, f32)>,
}

impl FeatureSpec {
    const fn clamped(name: &'static str, lo: f32, hi: f32) -> Self {
        Self { name, range: Some((lo, hi)) }
    }

    const fn unclamped(name: &'static str) -> Self {
        Self { name, range: None }
    }
}

/// Ordered feature layout for one predictor.
#[derive(Debug, Clone, Copy)]
pub struct FeatureLayout {
    pub predictor: &'static str,
    pub specs: &'static [FeatureSpec],
}

// ============================================================================
// LAYOUTS (Authoritative source - order is the estimator input order)
// ============================================================================

/// Scalar object presence classifier
pub const OBJECT_LAYOUT: FeatureLayout = FeatureLayout {
    predictor: "object",
    specs: &[
        FeatureSpec::clamped("distance_cm", 0.0, 1000.0),
        FeatureSpec::clamped("detection_confidence", 0.0, 1.0),
        FeatureSpec::clamped("proximity_value", 0.0, 65535.0),
        FeatureSpec::clamped("ambient_light", 0.0, 10000.0),
    ],
};

/// Danger score regressor
pub const DANGER_LAYOUT: FeatureLayout = FeatureLayout {
    predictor: "danger",
    specs: &[
        FeatureSpec::clamped("distance_cm", 0.0, 1000.0),
        FeatureSpec::unclamped("rate_of_change"),
        FeatureSpec::clamped("proximity_value", 0.0, 65535.0),
        FeatureSpec::clamped("current_speed_estimate", 0.0, 10.0),
    ],
};

/// Device anomaly estimator
pub const ANOMALY_LAYOUT: FeatureLayout = FeatureLayout {
    predictor: "anomaly",
    specs: &[
        FeatureSpec::clamped("temperature_c", 0.0, 150.0),
        FeatureSpec::clamped("battery_level", 0.0, 100.0),
        FeatureSpec::clamped("cpu_usage", 0.0, 100.0),
        FeatureSpec::clamped("error_count", 0.0, 9999.0),
        FeatureSpec::clamped("rssi", -120.0, 0.0),
    ],
};

/// Environment classifier
pub const ENVIRONMENT_LAYOUT: FeatureLayout = FeatureLayout {
    predictor: "environment",
    specs: &[
        FeatureSpec::clamped("ambient_light_avg", 0.0, 10000.0),
        FeatureSpec::clamped("ambient_light_variance", 0.0, 10000.0),
        FeatureSpec::clamped("detection_frequency", 0.0, 100.0),
        FeatureSpec::clamped("average_obstacle_distance", 0.0, 1000.0),
        FeatureSpec::clamped("proximity_pattern_complexity", 0.0, 10.0),
        FeatureSpec::clamped("distance_variance", 0.0, 1000.0),
    ],
};

// ============================================================================
// LAYOUT HASH
// ============================================================================

impl FeatureLayout {
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// CRC32 over version, predictor name and ordered feature names.
    /// Used to detect layout drift between training and inference.
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[LAYOUT_VERSION]);
        hasher.update(self.predictor.as_bytes());
        hasher.update(&[0]);
        for spec in self.specs {
            hasher.update(spec.name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize()
    }

    /// Feature index by name (O(n), layouts are tiny)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }
}

// ============================================================================
// TESTS
// ============================================================================
