//! Inference Service
//!
//! Process-wide cached predictor with explicit lifecycle:
//!
//! - **Load once**: [`InferenceService::global`] builds the process-wide
//!   instance under an initialization lock; concurrent first callers wait and
//!   then share it. A failed first load leaves nothing cached, so a later call
//!   can retry.
//! - **Read**: every request clones the current `Arc<CropPredictor>` under a
//!   short read lock and predicts without holding any lock. The predictor is
//!   immutable.
//! - **Reload**: the new pair is read and validated completely before it is
//!   swapped in under the write lock. Requests that already hold the old
//!   `Arc` finish on the old pair; later requests see the new one. A failed
//!   reload keeps the current pair.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use crate::error::Result;
use crate::features::SoilSample;
use crate::inference::predictor::{CropPredictor, PredictionResult};
use crate::model::artifacts::ArtifactPaths;

static GLOBAL: OnceLock<InferenceService> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

/// Cached predictor plus the artifact location it reloads from
#[derive(Debug)]
pub struct InferenceService {
    paths: ArtifactPaths,
    current: RwLock<Arc<CropPredictor>>,
    loads: AtomicUsize,
}

impl InferenceService {
    /// Load the artifact pair into a new, independent service
    pub fn load(paths: ArtifactPaths) -> Result<Self> {
        let predictor = CropPredictor::load(&paths)?;
        tracing::info!(
            dir = %paths.dir.display(),
            classes = predictor.n_classes(),
            "inference service ready"
        );
        Ok(Self {
            paths,
            current: RwLock::new(Arc::new(predictor)),
            loads: AtomicUsize::new(1),
        })
    }

    /// Wrap an in-memory predictor (reload still reads from `paths`)
    pub fn from_predictor(paths: ArtifactPaths, predictor: CropPredictor) -> Self {
        Self {
            paths,
            current: RwLock::new(Arc::new(predictor)),
            loads: AtomicUsize::new(0),
        }
    }

    /// Process-wide instance, loaded from `paths` on first use
    ///
    /// Later calls return the cached instance and ignore `paths`.
    pub fn global(paths: &ArtifactPaths) -> Result<&'static InferenceService> {
        if let Some(service) = GLOBAL.get() {
            return Ok(service);
        }

        let _guard = GLOBAL_INIT.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(service) = GLOBAL.get() {
            return Ok(service);
        }
        let service = InferenceService::load(paths.clone())?;
        Ok(GLOBAL.get_or_init(|| service))
    }

    /// Process-wide instance if it has been initialized
    pub fn try_global() -> Option<&'static InferenceService> {
        GLOBAL.get()
    }

    /// Snapshot of the current predictor
    pub fn current(&self) -> Arc<CropPredictor> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn predict_top_k(&self, features: &[f64], k: usize) -> Result<PredictionResult> {
        self.current().predict_top_k(features, k)
    }

    pub fn predict_sample(&self, sample: &SoilSample, k: usize) -> Result<PredictionResult> {
        self.current().predict_sample(sample, k)
    }

    pub fn available_crops(&self) -> Vec<String> {
        self.current().available_crops().to_vec()
    }

    /// Re-read the artifacts and swap them in atomically
    pub fn reload(&self) -> Result<()> {
        let fresh = match CropPredictor::load(&self.paths) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::warn!(error = %e, "reload failed; keeping the cached model");
                return Err(e);
            }
        };

        let classes = fresh.n_classes();
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *guard = fresh;
        }
        self.loads.fetch_add(1, Ordering::SeqCst);

        tracing::info!(dir = %self.paths.dir.display(), classes, "reloaded model artifacts");
        Ok(())
    }

    /// Number of times artifacts have been read from disk
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}
