//! Cycle training
//!
//! One cycle = load the previous cycle's checkpoint, apply the unfreeze
//! policy, run the configured number of one-cycle epochs, save the new
//! checkpoint. Cycles form a strict linear lineage: cycle N requires the
//! checkpoint of cycle N-1.

use crate::checkpoint::{CheckpointMetadata, CheckpointStore};
use crate::cli::logging::{log, LogLevel};
use crate::config::CycleSpec;
use crate::error::Result;
use crate::model::{Learner, TrainSample};
use crate::optim::MomentumSpan;
use chrono::Utc;

/// Run one training cycle and save its checkpoint.
///
/// Steps, in order: load checkpoint `spec.cycle - 1` (missing predecessor
/// is fatal), apply the unfreeze policy for negative depths, fit exactly
/// `spec.iterations` epochs at `spec.max_lr`, save checkpoint `spec.cycle`.
/// All stochastic machinery (epoch shuffles) derives from `seed`, so a
/// cycle is reproducible given the same predecessor checkpoint. The learner
/// is mutated in place and left holding the new weights so the caller can
/// evaluate or continue without a reload.
///
/// # Errors
/// `Error::CheckpointNotFound` when the predecessor slot is missing; any
/// store or training error otherwise.
pub fn run_cycle(
    learner: &mut Learner,
    store: &CheckpointStore,
    samples: &[TrainSample],
    spec: &CycleSpec,
    seed: u64,
    level: LogLevel,
) -> Result<()> {
    store.load(learner.model_mut(), spec.cycle - 1)?;

    if spec.unfreeze_to < 0 {
        learner.freeze_to(spec.unfreeze_to);
    } else {
        // Depths >= 0 leave the current freeze state untouched; this is the
        // documented policy, not a missing case.
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  unfreeze depth {} >= 0: freeze state left unchanged",
                spec.unfreeze_to
            ),
        );
    }

    log(
        level,
        LogLevel::Normal,
        &format!(
            "cycle {} | unfreeze {} | {} epoch(s) | max lr {:.2e}",
            spec.cycle, spec.unfreeze_to, spec.iterations, spec.max_lr
        ),
    );

    let train_loss = learner.fit_one_cycle(
        samples,
        spec.iterations,
        spec.max_lr,
        MomentumSpan::default(),
        seed,
        level,
    )?;

    let metadata = CheckpointMetadata {
        cycle: spec.cycle,
        unfreeze_to: Some(spec.unfreeze_to),
        max_lr: Some(spec.max_lr),
        iterations: Some(spec.iterations),
        train_loss: Some(train_loss),
        saved_at: Utc::now(),
    };
    store.save(learner.model(), spec.cycle, &metadata)?;

    Ok(())
}
