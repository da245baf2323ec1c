//! Estimator & Scaler - ONNX Runtime wrappers for trained artifacts
//!
//! An `Estimator` owns one `ort` session. The session needs `&mut` to
//! run, so it sits behind its own mutex; the registry lock is never
//! held during inference.

use std::path::Path;

use ndarray::{Array2, Array4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

// ============================================================================
// ESTIMATOR
// ============================================================================

/// A trained estimator loaded from a `.onnx` artifact.
pub struct Estimator {
    name: String,
    session: Mutex<Session>,
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator").field("name", &self.name).finish()
    }
}

impl Estimator {
    /// Load a session from file.
    pub fn from_file(name: &str, path: &Path) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .map_err(|e| InferenceError::Session(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Session(format!("optimization level: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| InferenceError::Session(format!("load {}: {}", path.display(), e)))?;

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the session on a flat feature row, extracting every output
    /// as a numeric vector (f32 directly, i64 label outputs cast).
    fn run_raw(&self, features: &[f32]) -> Result<Vec<Vec<f32>>, InferenceError> {
        let input = Array2::<f32>::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| InferenceError::Tensor(format!("input array: {}", e)))?;

        let mut guard = self.session.lock();
        let session = &mut *guard;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();

        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Tensor(format!("input tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Session(format!("run: {}", e)))?;

        let mut extracted = Vec::with_capacity(output_names.len());
        for name in &output_names {
            let output = outputs
                .get(name)
                .ok_or_else(|| InferenceError::OutputShape(format!("missing output {}", name)))?;

            if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                extracted.push(data.to_vec());
            } else if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                extracted.push(data.iter().map(|&v| v as f32).collect());
            } else {
                // Non-numeric auxiliary output (e.g. a probability map); skip.
                log::debug!("{}: skipping non-tensor output {}", self.name, name);
            }
        }

        if extracted.is_empty() {
            return Err(InferenceError::OutputShape("no numeric outputs".into()));
        }
        Ok(extracted)
    }

    /// Predict a single scalar (first value of the first output).
    pub fn predict(&self, features: &[f32]) -> Result<f32, InferenceError> {
        let outputs = self.run_raw(features)?;
        outputs[0]
            .first()
            .copied()
            .ok_or_else(|| InferenceError::OutputShape("empty first output".into()))
    }

    /// Predict a class index: a single-value output is the label itself,
    /// a score vector is reduced by argmax.
    pub fn predict_class(&self, features: &[f32]) -> Result<usize, InferenceError> {
        let outputs = self.run_raw(features)?;
        let first = &outputs[0];
        match first.len() {
            0 => Err(InferenceError::OutputShape("empty first output".into())),
            1 => Ok(first[0].max(0.0) as usize),
            _ => {
                let mut best = 0usize;
                for (i, &v) in first.iter().enumerate() {
                    if v > first[best] {
                        best = i;
                    }
                }
                Ok(best)
            }
        }
    }

    /// Isolation-style estimator: binary outlier flag plus continuous
    /// decision score. Convention is sklearn's: label -1 = outlier, and
    /// the score is more negative for more anomalous samples.
    pub fn outlier(&self, features: &[f32]) -> Result<(bool, f32), InferenceError> {
        let outputs = self.run_raw(features)?;
        let label = outputs[0]
            .first()
            .copied()
            .ok_or_else(|| InferenceError::OutputShape("empty label output".into()))?;
        let score = outputs
            .get(1)
            .and_then(|o| o.first())
            .copied()
            .ok_or_else(|| InferenceError::OutputShape("missing score output".into()))?;
        Ok((label < 0.0, score))
    }

    /// Run the detection network on an NCHW image tensor; returns the
    /// first output's shape and flat data.
    pub fn infer_image(
        &self,
        input: Array4<f32>,
    ) -> Result<(Vec<usize>, Vec<f32>), InferenceError> {
        let mut guard = self.session.lock();
        let session = &mut *guard;

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| InferenceError::OutputShape("no output defined".into()))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Tensor(format!("input tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Session(format!("run: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| InferenceError::OutputShape("no output".into()))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Tensor(format!("extract: {}", e)))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        Ok((dims, data.to_vec()))
    }
}

// ============================================================================
// SCALER
// ============================================================================

/// Standard-scaler parameters exported at training time as a JSON
/// sidecar (`<name>.scaler.json`) next to the `.onnx` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl Scaler {
    pub fn from_file(path: &Path) -> Result<Self, InferenceError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::Session(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| InferenceError::Session(format!("parse {}: {}", path.display(), e)))
    }

    /// Transform features the way training did. Length must match the
    /// training layout exactly.
    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>, InferenceError> {
        if features.len() != self.mean.len() || features.len() != self.scale.len() {
            return Err(InferenceError::ScalerShape {
                expected: self.mean.len(),
                got: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&m, &s))| (x - m) / s.max(1e-8))
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
