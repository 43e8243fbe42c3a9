//! Command-line interface
//!
//! Argument structs mirror the run configuration one-to-one; everything is
//! resolved into an immutable [`crate::config::RunConfig`] and validated
//! before any data loading or model work starts.

mod commands;
pub mod logging;

pub use commands::run_command;
pub use logging::LogLevel;

use crate::config::{CycleSchedule, LabelColumn, ModelFamily, RunConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Afinar: cycle-based fine-tuning for multi-label text classification
#[derive(Parser, Debug, Clone)]
#[command(name = "afinar")]
#[command(version)]
#[command(about = "Fine-tune a text classifier over progressive-unfreezing cycles \
and score each cycle with ranking metrics")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the cycle fine-tuning pipeline (or the learning-rate probe)
    Finetune(FinetuneArgs),

    /// Summarize a dataset and the resolved cycle schedule without training
    Info(InfoArgs),
}

/// Arguments for the finetune command
#[derive(Parser, Debug, Clone)]
pub struct FinetuneArgs {
    /// Path to the dataset (csv or jsonl)
    #[arg(long, value_name = "PATH")]
    pub dataset_path: PathBuf,

    /// Directory with train.txt / validation.txt / test.txt id lists
    #[arg(long, value_name = "DIR")]
    pub dataset_split_path: Option<PathBuf>,

    /// Label column to train on
    #[arg(long, value_enum, default_value = "labels")]
    pub label_col: LabelColumn,

    /// Keep original casing (the default lowercases all text)
    #[arg(long)]
    pub cased: bool,

    /// Encoder family preset
    #[arg(long, value_enum, default_value = "encoder")]
    pub model_family: ModelFamily,

    /// Encoder size preset
    #[arg(long, default_value = "encoder-base")]
    pub pretrained_model: String,

    /// Maximum token sequence length
    #[arg(long, default_value_t = 512)]
    pub max_len: usize,

    /// Batch size
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Total number of training cycles
    #[arg(long, default_value_t = 3)]
    pub total_cycles: usize,

    /// Start (or resume) from this cycle
    #[arg(long, default_value_t = 1)]
    pub start_cycle: usize,

    /// Epochs per cycle, comma separated; the last value extends
    #[arg(long, default_value = "12,12,12")]
    pub iterations: String,

    /// Max learning rate per cycle, comma separated; the last value extends
    #[arg(long, default_value = "2e-4,5e-5,5e-6")]
    pub lr: String,

    /// Unfreeze depth per cycle, comma separated; the last value extends
    #[arg(long, default_value = "-4,-8,-12", allow_hyphen_values = true)]
    pub unfreeze: String,

    /// Experiment name; keys checkpoint and results paths
    #[arg(long)]
    pub experiment_name: String,

    /// Probe-only mode: sweep learning rates instead of training
    #[arg(long)]
    pub lr_find: bool,

    /// Seed for all pseudo-random state, reapplied at every cycle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Root directory under which models/ and experiments/ are created
    #[arg(long, default_value = ".")]
    pub output_root: PathBuf,
}

impl FinetuneArgs {
    /// Resolve into the validated run configuration.
    ///
    /// # Errors
    /// `Error::Config` for unparseable schedule lists or invalid bounds.
    pub fn into_config(self) -> Result<RunConfig> {
        let schedule = CycleSchedule::parse(&self.iterations, &self.lr, &self.unfreeze)?;
        let config = RunConfig {
            dataset_path: self.dataset_path,
            split_dir: self.dataset_split_path,
            label_column: self.label_col,
            cased: self.cased,
            model_family: self.model_family,
            pretrained_model: self.pretrained_model,
            max_len: self.max_len,
            batch_size: self.batch_size,
            total_cycles: self.total_cycles,
            start_cycle: self.start_cycle,
            schedule,
            experiment_name: self.experiment_name,
            lr_find: self.lr_find,
            seed: self.seed,
            output_root: self.output_root,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    /// Path to the dataset (csv or jsonl)
    #[arg(long, value_name = "PATH")]
    pub dataset_path: PathBuf,

    /// Directory with train.txt / validation.txt / test.txt id lists
    #[arg(long, value_name = "DIR")]
    pub dataset_split_path: Option<PathBuf>,

    /// Label column to summarize
    #[arg(long, value_enum, default_value = "labels")]
    pub label_col: LabelColumn,

    /// Keep original casing
    #[arg(long)]
    pub cased: bool,

    /// Epochs per cycle, comma separated
    #[arg(long, default_value = "12,12,12")]
    pub iterations: String,

    /// Max learning rate per cycle, comma separated
    #[arg(long, default_value = "2e-4,5e-5,5e-6")]
    pub lr: String,

    /// Unfreeze depth per cycle, comma separated
    #[arg(long, default_value = "-4,-8,-12", allow_hyphen_values = true)]
    pub unfreeze: String,

    /// Number of cycles to show the resolved schedule for
    #[arg(long, default_value_t = 3)]
    pub total_cycles: usize,
}
