//! Run configuration: CLI-facing options resolved into one immutable struct
//!
//! Every recognized option is enumerated here and validated before any data
//! loading or model construction happens. Per-cycle hyperparameter lists are
//! parsed into a [`CycleSchedule`] whose final entry extends to cover any
//! cycle index beyond the configured list length.

use crate::error::{Error, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Label columns recognized in the input dataset.
///
/// The requested column must be one of this fixed set; anything else is
/// rejected before data loading starts.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColumn {
    Labels,
    Domain,
    Domains,
    MThesaurus,
    Topterm,
    ExtDesc,
    Descriptors,
}

impl LabelColumn {
    /// Column name as it appears in the dataset header.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelColumn::Labels => "Labels",
            LabelColumn::Domain => "Domain",
            LabelColumn::Domains => "Domains",
            LabelColumn::MThesaurus => "MThesaurus",
            LabelColumn::Topterm => "Topterm",
            LabelColumn::ExtDesc => "ExtDesc",
            LabelColumn::Descriptors => "Descriptors",
        }
    }
}

/// Encoder family preset. Pad-first families pad sequences at the front
/// (the original XLNet-style convention); the default pads at the back.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Encoder,
    EncoderPadFirst,
}

impl ModelFamily {
    #[must_use]
    pub fn pad_first(&self) -> bool {
        matches!(self, ModelFamily::EncoderPadFirst)
    }
}

/// Resolved hyperparameters for one training cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSpec {
    /// 1-based cycle index
    pub cycle: usize,
    /// Trailing blocks left trainable; negative counts from the end,
    /// values >= 0 leave the current freeze state untouched
    pub unfreeze_to: i64,
    /// Optimization epochs to run in this cycle
    pub iterations: usize,
    /// Peak learning rate for the one-cycle schedule
    pub max_lr: f32,
}

/// Per-cycle hyperparameter lists.
///
/// Cycle N (1-based) uses entry N-1 of each list; indices past the end of a
/// list resolve to the last configured value, so a run may have more cycles
/// than entries without error.
#[derive(Debug, Clone)]
pub struct CycleSchedule {
    iterations: Vec<usize>,
    max_lrs: Vec<f32>,
    unfreeze: Vec<i64>,
}

impl CycleSchedule {
    /// Build a schedule from already-parsed lists.
    ///
    /// # Errors
    /// Returns `Error::Config` if any list is empty, an iteration count is
    /// zero, or a learning rate is not positive.
    pub fn new(iterations: Vec<usize>, max_lrs: Vec<f32>, unfreeze: Vec<i64>) -> Result<Self> {
        if iterations.is_empty() || max_lrs.is_empty() || unfreeze.is_empty() {
            return Err(Error::Config(
                "cycle schedule lists must not be empty".to_string(),
            ));
        }
        if let Some(n) = iterations.iter().find(|&&n| n == 0) {
            return Err(Error::Config(format!("iteration count must be > 0, got {n}")));
        }
        if let Some(lr) = max_lrs.iter().find(|&&lr| lr <= 0.0 || !lr.is_finite()) {
            return Err(Error::Config(format!("learning rate must be > 0, got {lr}")));
        }
        Ok(Self { iterations, max_lrs, unfreeze })
    }

    /// Parse comma-separated option strings, e.g. `"12,12,12"` / `"2e-4,5e-5"`.
    ///
    /// # Errors
    /// Returns `Error::Config` on any unparseable element or empty list.
    pub fn parse(iterations: &str, max_lrs: &str, unfreeze: &str) -> Result<Self> {
        let iterations = parse_list::<usize>(iterations, "iterations")?;
        let max_lrs = parse_list::<f32>(max_lrs, "lr")?;
        let unfreeze = parse_list::<i64>(unfreeze, "unfreeze")?;
        Self::new(iterations, max_lrs, unfreeze)
    }

    /// Resolve the hyperparameters for a 1-based cycle index.
    ///
    /// Indices beyond the configured lists reuse the last entry rather than
    /// erroring (overrun-extension law).
    #[must_use]
    pub fn resolve(&self, cycle: usize) -> CycleSpec {
        debug_assert!(cycle >= 1, "cycle indices are 1-based");
        let idx = cycle - 1;
        let last = |len: usize| idx.min(len - 1);
        CycleSpec {
            cycle,
            unfreeze_to: self.unfreeze[last(self.unfreeze.len())],
            iterations: self.iterations[last(self.iterations.len())],
            max_lr: self.max_lrs[last(self.max_lrs.len())],
        }
    }
}

fn parse_list<T: std::str::FromStr>(raw: &str, name: &str) -> Result<Vec<T>> {
    let values: std::result::Result<Vec<T>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<T>)
        .collect();
    match values {
        Ok(v) if !v.is_empty() => Ok(v),
        Ok(_) => Err(Error::Config(format!("--{name} list is empty"))),
        Err(_) => Err(Error::Config(format!("--{name}: cannot parse '{raw}'"))),
    }
}

/// Immutable configuration for one fine-tuning run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the tabular dataset
    pub dataset_path: PathBuf,
    /// Optional directory with train.txt / validation.txt / test.txt id lists
    pub split_dir: Option<PathBuf>,
    /// Which label column to train on
    pub label_column: LabelColumn,
    /// Keep original casing; the default lowercases all text at load
    pub cased: bool,
    /// Encoder family preset
    pub model_family: ModelFamily,
    /// Encoder size preset name
    pub pretrained_model: String,
    /// Maximum token sequence length
    pub max_len: usize,
    /// Training batch size
    pub batch_size: usize,
    /// Total number of cycles to run
    pub total_cycles: usize,
    /// First cycle to run (resume point); cycle numbering is 1-based
    pub start_cycle: usize,
    /// Per-cycle hyperparameters
    pub schedule: CycleSchedule,
    /// Experiment name; keys checkpoint and results paths
    pub experiment_name: String,
    /// Probe-only mode: sweep learning rates instead of training
    pub lr_find: bool,
    /// Seed for all pseudo-random state, reapplied at every cycle
    pub seed: u64,
    /// Root under which models/ and experiments/ are created
    pub output_root: PathBuf,
}

impl RunConfig {
    /// Validate cross-field invariants. Called once, before any heavy work.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.experiment_name.is_empty() {
            return Err(Error::Config("experiment name must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be > 0".to_string()));
        }
        if self.max_len == 0 {
            return Err(Error::Config("max sequence length must be > 0".to_string()));
        }
        if self.start_cycle == 0 {
            return Err(Error::Config("start cycle is 1-based, got 0".to_string()));
        }
        if self.start_cycle > self.total_cycles {
            return Err(Error::Config(format!(
                "start cycle {} is past total cycles {}",
                self.start_cycle, self.total_cycles
            )));
        }
        Ok(())
    }

    /// Checkpoint store root for this experiment: `<root>/models/<name>`.
    #[must_use]
    pub fn model_dir(&self) -> PathBuf {
        self.output_root.join("models").join(&self.experiment_name)
    }

    /// Experiment artifacts root: `<root>/experiments/<name>`.
    #[must_use]
    pub fn experiment_dir(&self) -> PathBuf {
        self.output_root.join("experiments").join(&self.experiment_name)
    }

    /// Directory for learning-rate probe plots.
    #[must_use]
    pub fn lr_find_dir(&self) -> PathBuf {
        self.experiment_dir().join("lrFind")
    }

    /// Probe plot path for one cycle: `.../lrFind/<cycle>.png`.
    #[must_use]
    pub fn lr_find_plot(&self, cycle: usize) -> PathBuf {
        self.lr_find_dir().join(format!("{cycle}.png"))
    }

    /// Append-only results file: `.../results.csv`.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.experiment_dir().join("results.csv")
    }

    /// Create the experiment directory tree.
    ///
    /// # Errors
    /// Returns `Error::Io` if a directory cannot be created.
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [self.model_dir(), self.lr_find_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| Error::Io(format!("cannot create {}: {e}", dir.display())))?;
        }
        Ok(())
    }
}

/// Build a default-valued config for tests and examples rooted at `root`.
#[doc(hidden)]
pub fn test_config(dataset: &Path, experiment: &str, root: &Path) -> RunConfig {
    RunConfig {
        dataset_path: dataset.to_path_buf(),
        split_dir: None,
        label_column: LabelColumn::Labels,
        cased: false,
        model_family: ModelFamily::Encoder,
        pretrained_model: "encoder-mini".to_string(),
        max_len: 64,
        batch_size: 4,
        total_cycles: 1,
        start_cycle: 1,
        schedule: CycleSchedule::new(vec![1], vec![1e-4], vec![-1]).expect("static schedule"),
        experiment_name: experiment.to_string(),
        lr_find: false,
        seed: 42,
        output_root: root.to_path_buf(),
    }
}
