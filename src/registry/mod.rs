//! Model Registry - one-load-per-artifact cache
//!
//! Resolves named artifacts from the model directory, caches them for
//! the process lifetime and hands out shared bundles. A missing or
//! corrupt artifact is never an error: the cause is logged and the
//! caller gets `None`, which routes the request to rule fallback.
//!
//! Concurrency: reads go through an RwLock map; the first load of each
//! name is serialized by a dedicated load mutex with a re-check, so
//! concurrent first requests cannot duplicate disk reads or observe a
//! half-constructed bundle. Inference itself only takes the estimator's
//! own session mutex, never the registry locks.

mod estimator;

pub use estimator::{Estimator, Scaler};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::constants;
use crate::error::InferenceError;

// ============================================================================
// MODEL BUNDLE
// ============================================================================

/// A loaded artifact: either the estimator alone, or the estimator with
/// the feature scaler it was trained behind. If a scaler is present the
/// features MUST be transformed before predicting.
#[derive(Debug)]
pub enum ModelBundle {
    Bare(Estimator),
    Scaled(Estimator, Scaler),
}

impl ModelBundle {
    pub fn estimator(&self) -> &Estimator {
        match self {
            ModelBundle::Bare(e) => e,
            ModelBundle::Scaled(e, _) => e,
        }
    }

    pub fn has_scaler(&self) -> bool {
        matches!(self, ModelBundle::Scaled(..))
    }

    /// Apply the scaler when one exists, otherwise pass features through.
    pub fn prepare(&self, features: &[f32]) -> Result<Vec<f32>, InferenceError> {
        match self {
            ModelBundle::Bare(_) => Ok(features.to_vec()),
            ModelBundle::Scaled(_, scaler) => scaler.transform(features),
        }
    }
}

/// Diagnostic metadata for one cached bundle.
#[derive(Debug, Clone, Serialize)]
pub struct BundleInfo {
    pub name: String,
    pub path: String,
    pub has_scaler: bool,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Read-through artifact cache, created once at startup and injected
/// into every predictor.
pub struct ModelRegistry {
    model_dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<ModelBundle>>>,
    info: RwLock<HashMap<String, BundleInfo>>,
    load_lock: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cache: RwLock::new(HashMap::new()),
            info: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
        }
    }

    /// Registry rooted at the configured model directory.
    pub fn from_env() -> Self {
        Self::new(constants::model_dir())
    }

    /// Resolve a bundle by artifact name. `None` means "use fallback":
    /// the artifact does not exist or failed to load (cause logged).
    pub fn get(&self, name: &str) -> Option<Arc<ModelBundle>> {
        if let Some(bundle) = self.cache.read().get(name) {
            return Some(bundle.clone());
        }

        // Single loader per name: take the load lock, then re-check in
        // case another thread finished the load while we waited.
        let _guard = self.load_lock.lock();
        if let Some(bundle) = self.cache.read().get(name) {
            return Some(bundle.clone());
        }

        let path = self.artifact_path(name);
        if !path.exists() {
            log::debug!("model artifact {} not found at {}", name, path.display());
            return None;
        }

        match self.load(name, &path) {
            Ok(bundle) => {
                let bundle = Arc::new(bundle);
                self.info.write().insert(
                    name.to_string(),
                    BundleInfo {
                        name: name.to_string(),
                        path: path.display().to_string(),
                        has_scaler: bundle.has_scaler(),
                        loaded_at: Utc::now(),
                    },
                );
                self.cache.write().insert(name.to_string(), bundle.clone());
                log::info!(
                    "model artifact {} loaded ({})",
                    name,
                    if bundle.has_scaler() { "estimator + scaler" } else { "bare estimator" }
                );
                Some(bundle)
            }
            Err(e) => {
                log::warn!("model artifact {} failed to load: {}", name, e);
                None
            }
        }
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.model_dir.join(format!("{}.onnx", name))
    }

    fn scaler_path(&self, name: &str) -> PathBuf {
        self.model_dir.join(format!("{}.scaler.json", name))
    }

    fn load(&self, name: &str, path: &Path) -> Result<ModelBundle, InferenceError> {
        let estimator = Estimator::from_file(name, path)?;
        let scaler_path = self.scaler_path(name);
        if scaler_path.exists() {
            let scaler = Scaler::from_file(&scaler_path)?;
            Ok(ModelBundle::Scaled(estimator, scaler))
        } else {
            Ok(ModelBundle::Bare(estimator))
        }
    }

    /// Metadata for every bundle loaded so far.
    pub fn status(&self) -> Vec<BundleInfo> {
        let mut infos: Vec<BundleInfo> = self.info.read().values().cloned().collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

// ============================================================================
// TESTS
// ============================================================================
