//! Learning-rate probe
//!
//! Diagnostic sweep for one cycle: loads the predecessor checkpoint and
//! applies the unfreeze policy exactly like cycle training, then drives the
//! learning rate through an exponential range while taking mini optimization
//! steps, and renders the loss curve to a PNG. Purely advisory — it never
//! saves a checkpoint, so the lineage is untouched.

use crate::checkpoint::CheckpointStore;
use crate::cli::logging::{log, LogLevel};
use crate::config::CycleSpec;
use crate::error::{Error, Result};
use crate::model::{Learner, TrainSample};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Sweep range, low end.
pub const LR_SWEEP_START: f32 = 1e-7;
/// Sweep range, high end.
pub const LR_SWEEP_END: f32 = 10.0;
/// Stop once the smoothed loss exceeds this multiple of the best seen.
pub const LR_DIVERGENCE_FACTOR: f32 = 4.0;
/// Mini-steps per configured iteration.
const STEPS_PER_ITERATION: usize = 25;
/// Exponential moving average factor for the recorded curve.
const SMOOTHING: f32 = 0.98;

/// Fresh deterministic RNG for the sweep's batch sampling.
///
/// Every probe reseeds from the run-level seed so a sweep is reproducible
/// given the same predecessor checkpoint.
#[must_use]
pub fn reseed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Exponentially spaced learning rates between the sweep bounds.
fn lr_grid(steps: usize) -> Vec<f32> {
    let steps = steps.max(2);
    let ratio = (LR_SWEEP_END / LR_SWEEP_START).ln();
    (0..steps)
        .map(|i| {
            let t = i as f32 / (steps - 1) as f32;
            LR_SWEEP_START * (ratio * t).exp()
        })
        .collect()
}

/// Run the sweep for one cycle and write the diagnostic plot.
///
/// # Errors
/// `Error::CheckpointNotFound` when the predecessor slot is missing, or an
/// IO/render error from writing the plot.
pub fn run_probe(
    learner: &mut Learner,
    store: &CheckpointStore,
    samples: &[TrainSample],
    spec: &CycleSpec,
    seed: u64,
    output_path: &Path,
    level: LogLevel,
) -> Result<()> {
    let mut rng = reseed(seed);

    store.load(learner.model_mut(), spec.cycle - 1)?;
    if spec.unfreeze_to < 0 {
        learner.freeze_to(spec.unfreeze_to);
    }

    let grid = lr_grid(spec.iterations * STEPS_PER_ITERATION);
    let losses = learner.lr_sweep(samples, &grid, &mut rng)?;

    // Smooth the curve and truncate once it diverges
    let mut curve: Vec<(f32, f32)> = Vec::with_capacity(losses.len());
    let mut smoothed = losses.first().copied().unwrap_or(0.0);
    let mut best = f32::INFINITY;
    for (&lr, &loss) in grid.iter().zip(losses.iter()) {
        smoothed = SMOOTHING * smoothed + (1.0 - SMOOTHING) * loss;
        curve.push((lr, smoothed));
        best = best.min(smoothed);
        if smoothed > LR_DIVERGENCE_FACTOR * best {
            break;
        }
    }

    if curve.len() < 2 {
        return Err(Error::Train(
            "learning-rate sweep produced too few points to plot".to_string(),
        ));
    }

    let suggestion = curve
        .iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|&(lr, _)| lr / 10.0)
        .unwrap_or(LR_SWEEP_START);

    write_plot(&curve, output_path)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "cycle {} | lr sweep over {} step(s) | suggestion {:.2e} | plot {}",
            spec.cycle,
            curve.len(),
            suggestion,
            output_path.display()
        ),
    );
    Ok(())
}

/// Render the smoothed sweep curve to a PNG file.
fn write_plot(curve: &[(f32, f32)], path: &Path) -> Result<()> {
    use trueno_viz::output::PngEncoder;
    use trueno_viz::plots::{LossCurve, MetricSeries};
    use trueno_viz::prelude::Rgba;
    use trueno_viz::prelude::WithDimensions;

    let mut plot = LossCurve::new()
        .add_series(MetricSeries::new("loss", Rgba::rgb(66, 133, 244)))
        .dimensions(800, 400)
        .margin(2)
        .best_markers(true)
        .lower_is_better(true)
        .build()
        .map_err(|e| Error::Train(format!("failed to build sweep plot: {e}")))?;

    for &(_, loss) in curve {
        plot.push(0, loss);
    }

    let fb = plot
        .to_framebuffer()
        .map_err(|e| Error::Train(format!("failed to render sweep plot: {e}")))?;
    let png = PngEncoder::to_bytes(&fb)
        .map_err(|e| Error::Train(format!("failed to encode sweep plot: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("cannot create {}: {e}", parent.display())))?;
    }
    std::fs::write(path, png)
        .map_err(|e| Error::Io(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointMetadata;
    use crate::config::test_config;

    #[test]
    fn test_lr_grid_is_monotone_and_bounded() {
        let grid = lr_grid(50);
        assert_eq!(grid.len(), 50);
        assert!((grid[0] - LR_SWEEP_START).abs() < 1e-12);
        assert!((grid[49] - LR_SWEEP_END).abs() < 1e-3);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_probe_requires_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(Path::new("data.jsonl"), "exp", dir.path());
        let mut learner = Learner::new(&cfg, 2).unwrap();
        let store = CheckpointStore::new(&cfg.model_dir(), &cfg.experiment_name);
        let samples = vec![TrainSample { ids: vec![1], targets: vec![1.0, 0.0] }];

        let spec = CycleSpec { cycle: 1, unfreeze_to: -1, iterations: 1, max_lr: 1e-4 };
        let result = run_probe(
            &mut learner,
            &store,
            &samples,
            &spec,
            42,
            &cfg.lr_find_plot(1),
            LogLevel::Quiet,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_never_saves_a_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(Path::new("data.jsonl"), "exp", dir.path());
        let mut learner = Learner::new(&cfg, 2).unwrap();
        let store = CheckpointStore::new(&cfg.model_dir(), &cfg.experiment_name);
        store
            .save(learner.model(), 0, &CheckpointMetadata::pristine())
            .unwrap();
        let samples = vec![
            TrainSample { ids: vec![1, 2], targets: vec![1.0, 0.0] },
            TrainSample { ids: vec![3], targets: vec![0.0, 1.0] },
        ];

        let spec = CycleSpec { cycle: 1, unfreeze_to: -1, iterations: 1, max_lr: 1e-4 };
        let _ = run_probe(
            &mut learner,
            &store,
            &samples,
            &spec,
            42,
            &cfg.lr_find_plot(1),
            LogLevel::Quiet,
        );
        // Whatever the render outcome, the lineage must be untouched
        assert!(!store.exists(1));
    }
}
