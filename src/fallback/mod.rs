//! Rule Fallback Engine
//!
//! Deterministic decision logic, one function per judgment, used
//! whenever a trained artifact is missing or fails during inference.
//! Each function produces the same value shape its model path does, so
//! downstream post-processing and result assembly are identical on both
//! paths.

/// Danger score from bucketed distance and approach-rate points.
///
/// The object's risk multiplier shrinks the effective distance so that
/// a person at 40cm scores like an inert obstacle at ~27cm.
pub fn danger_rules(distance_cm: f32, rate_of_change: f32, risk_multiplier: f32) -> f32 {
    let eff_dist = distance_cm / risk_multiplier;

    let mut score = 0.0f32;
    if eff_dist < 30.0 {
        score += 70.0;
    } else if eff_dist < 100.0 {
        score += 50.0;
    } else if eff_dist < 200.0 {
        score += 25.0;
    } else if eff_dist < 350.0 {
        score += 10.0;
    }

    // Negative rate = approaching
    if rate_of_change < -20.0 {
        score += 30.0;
    } else if rate_of_change < -10.0 {
        score += 20.0;
    } else if rate_of_change < -5.0 {
        score += 10.0;
    } else if rate_of_change < 0.0 {
        score += 5.0;
    }

    score.clamp(0.0, 100.0)
}

/// Device anomaly from rule-violation counts.
///
/// Returns `(score in [0,1], is_anomaly)`. Rule-based confidence is not
/// calibrated; the caller reports the constant floor 0.6.
pub fn anomaly_rules(
    temperature_c: f32,
    battery_level: f32,
    cpu_usage: f32,
    error_count: f32,
) -> (f32, bool) {
    let mut issues = 0u32;

    if temperature_c > 80.0 {
        issues += 2;
    } else if temperature_c > 70.0 {
        issues += 1;
    }

    if battery_level < 10.0 {
        issues += 2;
    } else if battery_level < 20.0 {
        issues += 1;
    }

    if cpu_usage > 95.0 {
        issues += 2;
    } else if cpu_usage > 85.0 {
        issues += 1;
    }

    if error_count > 10.0 {
        issues += 2;
    } else if error_count > 5.0 {
        issues += 1;
    }

    let score = (issues as f32 / 7.0).min(1.0);
    (score, score > 0.4)
}

/// Environment label from ordered rules. Returns `(label, confidence)`.
pub fn environment_rules(
    ambient_light_avg: f32,
    average_obstacle_distance: f32,
    proximity_pattern_complexity: f32,
) -> (&'static str, f32) {
    if ambient_light_avg > 700.0 && average_obstacle_distance > 200.0 {
        ("outdoor", 0.75)
    } else if ambient_light_avg < 200.0 {
        ("dark_indoor", 0.70)
    } else if proximity_pattern_complexity > 6.0 {
        ("complex_indoor", 0.70)
    } else {
        ("indoor", 0.70)
    }
}

/// Scalar object presence from range evidence. Returns
/// `(label, confidence, detected)`.
///
/// Without a trained classifier the sensors can only say that something
/// solid is close, not what it is, so the label is always "obstacle"
/// when presence is inferred and "none" otherwise.
pub fn object_rules(
    distance_cm: f32,
    proximity_value: f32,
    detection_confidence: f32,
) -> (&'static str, f32, bool) {
    if distance_cm < 50.0 || proximity_value > 50000.0 {
        ("obstacle", 0.8, true)
    } else if distance_cm < 200.0 && detection_confidence > 0.5 {
        ("obstacle", detection_confidence, true)
    } else {
        ("none", 0.0, false)
    }
}

// ============================================================================
// TESTS
// ============================================================================
