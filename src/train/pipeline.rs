//! The cycle fine-tuning pipeline
//!
//! Sequencing, in order: load split lists and corpus, build the trained
//! vocabulary and the learner, take the cycle-0 snapshot, run the single
//! vocabulary growth pass and freeze the full snapshot, then drive cycles
//! `start..=total`: train (or probe), evaluate, append the ledger row.
//! Vocabulary growth completes strictly before the first evaluation reads
//! the column count, so zero-shot columns are never undercounted.

use crate::checkpoint::{CheckpointMetadata, CheckpointStore};
use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::data::{load_corpus, Corpus, LabelVocab, Split, SplitLists};
use crate::error::Result;
use crate::eval::evaluate_cycle;
use crate::model::{Learner, TrainSample};
use crate::results::ResultsLedger;
use crate::train::{run_cycle, run_probe};

/// Run the whole pipeline for one experiment.
///
/// # Errors
/// Training and checkpoint errors are fatal. An evaluation error is scoped
/// to its cycle: the error is reported, that cycle's ledger row is skipped,
/// and the run continues with the next cycle.
pub fn run(config: &RunConfig, level: LogLevel) -> Result<()> {
    config.validate()?;
    config.create_dirs()?;

    let lists = match &config.split_dir {
        Some(dir) => SplitLists::load(dir, level),
        None => SplitLists::empty(),
    };
    let corpus = load_corpus(config, &lists, level)?;

    let (mut vocab, learner, samples) = prepare_training(config, &corpus, level)?;

    let store = CheckpointStore::new(&config.model_dir(), &config.experiment_name);
    let mut learner = learner;
    if !store.exists(0) {
        store.save(learner.model(), 0, &CheckpointMetadata::pristine())?;
        log(level, LogLevel::Normal, "saved pristine checkpoint 0");
    }

    // Single growth pass over every split; evaluation reads only the frozen
    // snapshot taken here.
    let before = vocab.len();
    let added = vocab.grow_from_docs(corpus.docs());
    let snapshot = vocab.snapshot();
    log(
        level,
        LogLevel::Normal,
        &format!(
            "label vocabulary: {before} trained column(s), {added} zero-shot, {} total",
            snapshot.len()
        ),
    );

    let ledger = ResultsLedger::new(&config.results_path());

    for cycle in config.start_cycle..=config.total_cycles {
        let spec = config.schedule.resolve(cycle);

        if config.lr_find {
            run_probe(
                &mut learner,
                &store,
                &samples,
                &spec,
                config.seed,
                &config.lr_find_plot(cycle),
                level,
            )?;
            continue;
        }

        run_cycle(&mut learner, &store, &samples, &spec, config.seed, level)?;

        match evaluate_cycle(&learner, &corpus, &snapshot, level) {
            Ok(metrics) => ledger.append(&metrics.to_row())?,
            Err(e) => log(
                level,
                LogLevel::Normal,
                &format!("cycle {cycle}: evaluation failed ({e}); ledger row skipped"),
            ),
        }
    }

    Ok(())
}

/// Build the trained vocabulary, the learner sized to it, and the encoded
/// training samples.
fn prepare_training(
    config: &RunConfig,
    corpus: &Corpus,
    level: LogLevel,
) -> Result<(LabelVocab, Learner, Vec<TrainSample>)> {
    let vocab = LabelVocab::from_training_docs(corpus.docs());
    let trained = vocab.snapshot();
    let learner = Learner::new(config, trained.len().max(1))?;

    let samples: Vec<TrainSample> = corpus
        .of_split(Split::Train)
        .into_iter()
        .map(|doc| {
            let mut targets = trained.multi_hot(&doc.labels_raw);
            targets.resize(learner.num_labels(), 0.0);
            TrainSample { ids: learner.encode(&doc.text), targets }
        })
        .collect();

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "prepared {} training sample(s) over {} label column(s)",
            samples.len(),
            trained.len()
        ),
    );
    Ok((vocab, learner, samples))
}
