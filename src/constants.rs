//! Central Configuration Constants
//!
//! Single source of truth for artifact names and pipeline defaults.
//! To point the core at another artifact store, only edit this file
//! (or set the environment variables below).

use std::path::PathBuf;

/// Default directory holding model artifacts (`<name>.onnx` plus an
/// optional `<name>.scaler.json` sidecar).
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Artifact name for the danger score regressor
pub const DANGER_MODEL: &str = "danger_model";

/// Artifact name for the isolation-style device anomaly estimator
pub const ANOMALY_MODEL: &str = "anomaly_model";

/// Artifact name for the environment classifier
pub const ENVIRONMENT_MODEL: &str = "environment_model";

/// Artifact name for the scalar object presence classifier
pub const OBJECT_MODEL: &str = "object_model";

/// Artifact name for the camera detection network
pub const DETECTOR_MODEL: &str = "detector_model";

/// Detection confidence threshold (objectness x class score)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Non-max suppression IoU threshold
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.45;

/// Detection network input resolution (square)
pub const DETECTOR_INPUT_SIZE: u32 = 640;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model artifact directory from environment or use default
pub fn model_dir() -> PathBuf {
    std::env::var("HAZARD_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_DIR))
}
