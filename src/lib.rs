//! Afinar: cycle-based fine-tuning for multi-label text classification
//!
//! Fine-tunes an encoder text classifier over multiple training cycles with
//! progressive unfreezing and per-cycle one-cycle learning rates, evaluates
//! every cycle's checkpoint with ranking metrics (precision@k, nDCG@k, F1),
//! and appends one metrics row per cycle to an append-only results ledger.
//!
//! # Pipeline
//!
//! ```text
//! dataset + split lists
//!   -> label vocabulary (trained columns, then one growth pass)
//!   -> cycle N: load checkpoint N-1 -> unfreeze -> fit one-cycle -> save N
//!   -> evaluate (zero-shot padding, F1, precision@k, nDCG@k)
//!   -> results ledger row
//! ```
//!
//! Checkpoints form a strict linear lineage; cycle 0 is the pristine
//! post-construction snapshot. The optional learning-rate probe replaces
//! training with an advisory sweep that never touches the lineage.

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod model;
pub mod optim;
pub mod results;
pub mod train;

pub use checkpoint::{CheckpointMetadata, CheckpointStore};
pub use config::{CycleSchedule, CycleSpec, LabelColumn, ModelFamily, RunConfig};
pub use data::{Corpus, Document, LabelSnapshot, LabelVocab, Split, SplitLists};
pub use error::{Error, Result};
pub use eval::{evaluate_cycle, ndcg_at_k, precision_at_k, CycleMetrics};
pub use model::{Learner, TrainSample};
pub use results::ResultsLedger;
