//! Error types for the inference core.
//!
//! Nothing here is fatal to the process. `InferenceError` stops the
//! model path of a predictor and routes the request to rule fallback;
//! `FrameError` stops the frame pipeline and becomes a terminal
//! "no detection" response.

use thiserror::Error;

/// A trained estimator (or its scaler) failed during inference.
///
/// A *missing* artifact is not an error - the registry returns `None`
/// for that case and the predictor falls back silently.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("session error: {0}")]
    Session(String),

    #[error("tensor error: {0}")]
    Tensor(String),

    #[error("model output shape mismatch: {0}")]
    OutputShape(String),

    #[error("scaler expects {expected} features, got {got}")]
    ScalerShape { expected: usize, got: usize },
}

/// A frame pipeline stage failed.
///
/// Mapped to a terminal no-detection response at the pipeline boundary,
/// never surfaced to the caller as an error.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("undecodable image: {0}")]
    Decode(String),

    #[error("zero-dimension image")]
    EmptyImage,

    #[error("no detection model available")]
    NoModel,

    #[error("detection inference failed: {0}")]
    Inference(#[from] InferenceError),
}
