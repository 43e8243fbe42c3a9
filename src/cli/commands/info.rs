//! Info command: dataset and schedule summary without training

use crate::cli::logging::{log, LogLevel};
use crate::cli::InfoArgs;
use crate::config::{CycleSchedule, ModelFamily, RunConfig};
use crate::data::{load_corpus, LabelVocab, SplitLists};
use crate::error::Result;
use std::path::PathBuf;

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<()> {
    let schedule = CycleSchedule::parse(&args.iterations, &args.lr, &args.unfreeze)?;
    let total_cycles = args.total_cycles.max(1);
    let config = info_config(&args, schedule.clone(), total_cycles);

    let lists = match &config.split_dir {
        Some(dir) => SplitLists::load(dir, level),
        None => SplitLists::empty(),
    };
    let corpus = load_corpus(&config, &lists, LogLevel::Quiet)?;
    let (train, val, test, none) = corpus.split_counts();

    let mut vocab = LabelVocab::from_training_docs(corpus.docs());
    let trained = vocab.len();
    let zero_shot = vocab.grow_from_docs(corpus.docs());

    log(level, LogLevel::Normal, &format!("dataset: {}", config.dataset_path.display()));
    log(
        level,
        LogLevel::Normal,
        &format!(
            "documents: {} (train {train}, val {val}, test {test}, no split {none})",
            corpus.len()
        ),
    );
    log(
        level,
        LogLevel::Normal,
        &format!(
            "labels ({}): {trained} trained, {zero_shot} zero-shot, {} total",
            config.label_column.as_str(),
            vocab.len()
        ),
    );

    log(level, LogLevel::Normal, "schedule:");
    for cycle in 1..=total_cycles {
        let spec = config.schedule.resolve(cycle);
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  cycle {cycle}: unfreeze {}, {} epoch(s), max lr {:.2e}",
                spec.unfreeze_to, spec.iterations, spec.max_lr
            ),
        );
    }

    log(level, LogLevel::Verbose, "known labels:");
    for label in vocab.labels() {
        log(level, LogLevel::Verbose, &format!("  {label}"));
    }

    Ok(())
}

/// A config carrying only the fields dataset loading reads; the rest are
/// inert placeholders since info never trains.
fn info_config(args: &InfoArgs, schedule: CycleSchedule, total_cycles: usize) -> RunConfig {
    RunConfig {
        dataset_path: args.dataset_path.clone(),
        split_dir: args.dataset_split_path.clone(),
        label_column: args.label_col,
        cased: args.cased,
        model_family: ModelFamily::Encoder,
        pretrained_model: "encoder-base".to_string(),
        max_len: 512,
        batch_size: 4,
        total_cycles,
        start_cycle: 1,
        schedule,
        experiment_name: "info".to_string(),
        lr_find: false,
        seed: 42,
        output_root: PathBuf::from("."),
    }
}
