//! Afinar CLI
//!
//! Cycle fine-tuning entry point for the afinar library.
//!
//! # Usage
//!
//! ```bash
//! # Fine-tune for three cycles and evaluate each one
//! afinar finetune --dataset-path data.csv --experiment-name exp1
//!
//! # Resume from cycle 2
//! afinar finetune --dataset-path data.csv --experiment-name exp1 --start-cycle 2
//!
//! # Learning-rate probe instead of training
//! afinar finetune --dataset-path data.csv --experiment-name exp1 --lr-find
//!
//! # Dataset and schedule summary
//! afinar info --dataset-path data.csv
//! ```

use afinar::cli::{run_command, Cli};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
