//! Feature Validator - Clamp noisy sensor readings to physical ranges
//!
//! Out-of-range input is not an error: the value is bounded, a warning
//! names the feature and the violated bound, and processing continues.
//! Clamping is pure, per-feature, order-independent and idempotent.

mod layout;

pub use layout::{
    FeatureLayout, FeatureSpec, ANOMALY_LAYOUT, DANGER_LAYOUT, ENVIRONMENT_LAYOUT,
    LAYOUT_VERSION, OBJECT_LAYOUT,
};

/// Clamp `value` into `[lo, hi]`, logging when the bound bites.
pub fn clamp(value: f32, lo: f32, hi: f32, name: &str) -> f32 {
    let clamped = value.max(lo).min(hi);
    if clamped != value {
        log::warn!(
            "feature {} = {} outside [{}, {}], clamped to {}",
            name,
            value,
            lo,
            hi,
            clamped
        );
    }
    clamped
}

/// Build the ordered estimator input for a layout, clamping each slot
/// that declares a range. `values` must be in layout order.
pub fn apply_layout(layout: &FeatureLayout, values: &[f32]) -> Vec<f32> {
    debug_assert_eq!(values.len(), layout.len());
    log::debug!(
        "{} features v{} (layout {:08x})",
        layout.predictor,
        LAYOUT_VERSION,
        layout.hash()
    );
    layout
        .specs
        .iter()
        .zip(values.iter())
        .map(|(spec, &v)| match spec.range {
            Some((lo, hi)) => clamp(v, lo, hi, spec.name),
            None => v,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_clamp_inside_range_unchanged() {
        init_logs();
        assert_eq!(clamp(42.0, 0.0, 100.0, "cpu_usage"), 42.0);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(-5.0, 0.0, 100.0, "battery_level"), 0.0);
        assert_eq!(clamp(250.0, 0.0, 150.0, "temperature_c"), 150.0);
        assert_eq!(clamp(10.0, -120.0, 0.0, "rssi"), 0.0);
        assert_eq!(clamp(-200.0, -120.0, 0.0, "rssi"), -120.0);
    }

    #[test]
    fn test_clamp_idempotent() {
        for layout in [
            &OBJECT_LAYOUT,
            &DANGER_LAYOUT,
            &ANOMALY_LAYOUT,
            &ENVIRONMENT_LAYOUT,
        ] {
            for spec in layout.specs {
                if let Some((lo, hi)) = spec.range {
                    for v in [-1e6, lo, (lo + hi) / 2.0, hi, 1e6] {
                        let once = clamp(v, lo, hi, spec.name);
                        assert!(once >= lo && once <= hi);
                        assert_eq!(clamp(once, lo, hi, spec.name), once);
                    }
                }
            }
        }
    }

    #[test]
    fn test_apply_layout_clamps_ranged_slots() {
        // distance over range, rate untouched, proximity under range
        let out = apply_layout(&DANGER_LAYOUT, &[1500.0, -999.0, -3.0, 4.0]);
        assert_eq!(out, vec![1000.0, -999.0, 0.0, 4.0]);
    }

    #[test]
    fn test_apply_layout_passes_rate_of_change() {
        let out = apply_layout(&DANGER_LAYOUT, &[100.0, -64.5, 10.0, 1.0]);
        assert_eq!(out[1], -64.5);
    }
}
