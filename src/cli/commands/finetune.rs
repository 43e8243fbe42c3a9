//! Finetune command implementation

use crate::cli::logging::{log, LogLevel};
use crate::cli::FinetuneArgs;
use crate::error::Result;
use crate::train::pipeline;

pub fn run_finetune(args: FinetuneArgs, level: LogLevel) -> Result<()> {
    let config = args.into_config()?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "experiment '{}' | dataset {} | label column {} | cycles {}..={}{}",
            config.experiment_name,
            config.dataset_path.display(),
            config.label_column.as_str(),
            config.start_cycle,
            config.total_cycles,
            if config.lr_find { " | probe-only" } else { "" },
        ),
    );

    pipeline::run(&config, level)
}
