//! Hazard Advisor Core - Multi-Model Inference & Decision Fusion
//!
//! Per-request pipeline for a wearable assistive device: fuses
//! ultrasonic/proximity/light readings and camera frames into four
//! independent judgments (object, danger, device anomaly, environment).
//!
//! ## Architecture
//! - `features/` - Feature clamping, layouts, versioning
//! - `registry/` - One-load-per-artifact model cache (ONNX + optional scaler)
//! - `fallback/` - Deterministic rule engines used when no model is usable
//! - `predictors/` - Danger / Anomaly / Environment / Object scorers
//! - `detector/` - Camera frame pipeline (decode, infer, NMS, rank)
//!
//! Transport, auth, persistence and training live outside this crate; a
//! caller hands each predictor a validated request payload and consumes
//! the result. Every result carries `model_source` so callers can tell a
//! trained-model answer from a rule fallback.

pub mod constants;
pub mod error;

pub mod features;
pub mod registry;
pub mod fallback;
pub mod predictors;
pub mod detector;

mod advisor;

pub use advisor::HazardAdvisor;
pub use error::{FrameError, InferenceError};
pub use registry::{ModelBundle, ModelRegistry};
pub use predictors::ModelSource;
