//! Checkpoint store
//!
//! Snapshots are keyed by (experiment, cycle): weights in a SafeTensors file
//! via `aprender::nn::serialize`, provenance in a JSON sidecar. Each cycle
//! occupies its own slot; re-running a cycle overwrites only that slot, and
//! loading a missing slot is `Error::CheckpointNotFound`. Cycle 0 holds the
//! pristine post-construction snapshot.

use crate::error::{Error, Result};
use crate::model::EncoderClassifier;
use aprender::nn::serialize::{load_model, save_model};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Provenance recorded next to each snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Cycle that produced this snapshot; 0 for the pristine model
    pub cycle: usize,
    /// Unfreeze depth the cycle trained with (None for cycle 0)
    pub unfreeze_to: Option<i64>,
    /// Peak learning rate of the cycle (None for cycle 0)
    pub max_lr: Option<f32>,
    /// Epochs run in the cycle (None for cycle 0)
    pub iterations: Option<usize>,
    /// Final average training loss of the cycle, when one was run
    pub train_loss: Option<f32>,
    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,
}

impl CheckpointMetadata {
    /// Metadata for the cycle-0 pristine snapshot.
    #[must_use]
    pub fn pristine() -> Self {
        Self {
            cycle: 0,
            unfreeze_to: None,
            max_lr: None,
            iterations: None,
            train_loss: None,
            saved_at: Utc::now(),
        }
    }
}

/// Filesystem-backed store of model snapshots for one experiment.
pub struct CheckpointStore {
    dir: PathBuf,
    experiment: String,
}

impl CheckpointStore {
    /// Store rooted at `dir` (the experiment's model directory).
    #[must_use]
    pub fn new(dir: &Path, experiment: &str) -> Self {
        Self { dir: dir.to_path_buf(), experiment: experiment.to_string() }
    }

    fn weights_path(&self, cycle: usize) -> PathBuf {
        self.dir.join(format!("{cycle}.safetensors"))
    }

    fn metadata_path(&self, cycle: usize) -> PathBuf {
        self.dir.join(format!("{cycle}.json"))
    }

    /// Whether a snapshot exists for `cycle`.
    #[must_use]
    pub fn exists(&self, cycle: usize) -> bool {
        self.weights_path(cycle).exists()
    }

    /// Write the snapshot for `cycle`, overwriting only that slot.
    ///
    /// # Errors
    /// `Error::Io` on directory/file failures, `Error::Serialization` if the
    /// weights or metadata cannot be encoded.
    pub fn save(
        &self,
        model: &EncoderClassifier,
        cycle: usize,
        metadata: &CheckpointMetadata,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Io(format!("cannot create {}: {e}", self.dir.display())))?;

        let weights = self.weights_path(cycle);
        save_model(model, &weights)
            .map_err(|e| Error::Serialization(format!("failed to save weights: {e}")))?;

        let json = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.metadata_path(cycle), json)
            .map_err(|e| Error::Io(format!("cannot write checkpoint metadata: {e}")))?;
        Ok(())
    }

    /// Restore the snapshot for `cycle` into `model`.
    ///
    /// # Errors
    /// `Error::CheckpointNotFound` if the slot has never been written;
    /// `Error::Serialization` if the weights cannot be decoded.
    pub fn load(&self, model: &mut EncoderClassifier, cycle: usize) -> Result<CheckpointMetadata> {
        let weights = self.weights_path(cycle);
        if !weights.exists() {
            return Err(Error::CheckpointNotFound {
                experiment: self.experiment.clone(),
                cycle,
            });
        }

        load_model(model, &weights)
            .map_err(|e| Error::Serialization(format!("failed to load weights: {e}")))?;

        let meta_path = self.metadata_path(cycle);
        let json = std::fs::read_to_string(&meta_path)
            .map_err(|e| Error::Io(format!("cannot read {}: {e}", meta_path.display())))?;
        Ok(serde_json::from_str(&json)?)
    }
}
