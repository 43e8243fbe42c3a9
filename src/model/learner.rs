//! Trainable-model seam
//!
//! [`Learner`] owns the encoder classifier plus tokenizer and exposes the
//! operations cycle training needs: freeze-to-depth, a one-cycle epoch run,
//! score prediction, and access for checkpoint save/load. Freezing is
//! realized by constructing the optimizer over the trailing blocks and head
//! only; frozen parameters simply never enter an optimizer.

use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::error::Result;
use crate::model::encoder::{EncoderClassifier, EncoderConfig};
use crate::model::tokenizer::ByteTokenizer;
use crate::optim::{LrScheduler, MomentumSpan, OneCycleLr};
use aprender::autograd::Tensor;
use aprender::nn::optim::{AdamW, Optimizer};

/// One encoded training sample: token ids plus a multi-hot target row over
/// the trained label columns.
#[derive(Debug, Clone)]
pub struct TrainSample {
    pub ids: Vec<u32>,
    pub targets: Vec<f32>,
}

/// BCE with logits loss for multi-label targets.
///
/// Per element: `max(x, 0) - x * t + ln(1 + exp(-|x|))`, averaged over
/// columns. A non-finite total collapses to a large constant instead of
/// poisoning the epoch average.
#[must_use]
pub fn bce_with_logits_loss(logits: &Tensor, targets: &[f32]) -> f32 {
    let data = logits.data();
    debug_assert_eq!(data.len(), targets.len(), "logit/target width mismatch");

    let total: f32 = data
        .iter()
        .zip(targets.iter())
        .map(|(&x, &t)| x.max(0.0) - x * t + (1.0 + (-x.abs()).exp()).ln())
        .sum::<f32>()
        / targets.len().max(1) as f32;

    if total.is_finite() {
        total
    } else {
        100.0
    }
}

/// Numerically stable sigmoid.
fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// The trainable model handle shared by cycle training and evaluation.
pub struct Learner {
    model: EncoderClassifier,
    tokenizer: ByteTokenizer,
    batch_size: usize,
    /// First block whose parameters train; `None` = nothing frozen
    first_trainable_block: Option<usize>,
}

impl Learner {
    /// Construct a fresh learner for `num_labels` trained columns.
    ///
    /// # Errors
    /// Returns `Error::Config` for an unknown model preset.
    pub fn new(config: &RunConfig, num_labels: usize) -> Result<Self> {
        let encoder_cfg = EncoderConfig::preset(&config.pretrained_model)?;
        let tokenizer = ByteTokenizer::new(config.max_len, config.model_family.pad_first());
        Ok(Self {
            model: EncoderClassifier::new(encoder_cfg, num_labels),
            tokenizer,
            batch_size: config.batch_size,
            first_trainable_block: None,
        })
    }

    /// Encode one document's text.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.tokenizer.encode(text)
    }

    /// Number of label columns the model predicts.
    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.model.num_labels()
    }

    /// Keep only the trailing `|depth|` blocks (plus the head) trainable.
    ///
    /// `depth` is expected negative, counting blocks from the end; the cycle
    /// runner only calls this for negative depths.
    pub fn freeze_to(&mut self, depth: i64) {
        let n_blocks = self.model.num_blocks();
        let keep = depth.unsigned_abs() as usize;
        self.first_trainable_block = Some(n_blocks.saturating_sub(keep));
    }

    /// Current freeze state: index of the first trainable block, if any
    /// freezing has been applied.
    #[must_use]
    pub fn first_trainable_block(&self) -> Option<usize> {
        self.first_trainable_block
    }

    /// Run exactly `epochs` one-cycle optimization epochs at `max_lr`.
    ///
    /// Shuffles samples deterministically per epoch (`seed + epoch`), steps
    /// the optimizer per batch, and returns the final epoch's average loss.
    pub fn fit_one_cycle(
        &mut self,
        samples: &[TrainSample],
        epochs: usize,
        max_lr: f32,
        moms: MomentumSpan,
        seed: u64,
        level: LogLevel,
    ) -> Result<f32> {
        let batch_size = self.batch_size.max(1);
        let batches_per_epoch = samples.len().div_ceil(batch_size).max(1);
        let total_steps = epochs * batches_per_epoch;
        let mut scheduler = OneCycleLr::new(max_lr, total_steps, moms);

        let first_block = self.first_trainable_block;
        let mut optimizer = AdamW::new(
            self.model.trainable_parameters_mut(first_block),
            scheduler.get_lr(),
        );

        let mut order: Vec<usize> = (0..samples.len()).collect();
        let mut last_epoch_loss = 0.0f32;

        for epoch in 0..epochs {
            shuffle(&mut order, seed.wrapping_add(epoch as u64));

            let mut epoch_loss = 0.0f32;
            let mut seen = 0usize;

            for chunk in order.chunks(batch_size) {
                optimizer.set_lr(scheduler.get_lr());

                let mut batch_loss = 0.0f32;
                for &idx in chunk {
                    let sample = &samples[idx];
                    let logits = self.model.forward_logits(&sample.ids);
                    let loss = bce_with_logits_loss(&logits, &sample.targets);
                    let loss_t = Tensor::new(&[loss], &[1]);
                    loss_t.backward();
                    batch_loss += loss;
                }

                optimizer.step();
                optimizer.zero_grad();
                scheduler.step();

                epoch_loss += batch_loss;
                seen += chunk.len();
            }

            last_epoch_loss = epoch_loss / seen.max(1) as f32;
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "  epoch {:>2}/{epochs} | loss {last_epoch_loss:.4} | lr {:.2e} | mom {:.3}",
                    epoch + 1,
                    scheduler.get_lr(),
                    scheduler.get_momentum(),
                ),
            );
        }

        Ok(last_epoch_loss)
    }

    /// Sigmoid scores over the trained label columns for one document.
    #[must_use]
    pub fn predict_scores(&self, ids: &[u32]) -> Vec<f32> {
        let logits = self.model.forward_logits(ids);
        logits.data().iter().map(|&x| sigmoid(x)).collect()
    }

    /// Learning-rate sweep: one mini optimization step per entry of `lrs`
    /// on a randomly drawn sample, returning the observed losses.
    ///
    /// Mutates the in-memory weights; callers that must preserve them reload
    /// from a checkpoint afterwards (the probe never saves, so the lineage
    /// cannot be affected either way).
    pub fn lr_sweep(
        &mut self,
        samples: &[TrainSample],
        lrs: &[f32],
        rng: &mut rand::rngs::StdRng,
    ) -> Result<Vec<f32>> {
        use rand::Rng;

        if samples.is_empty() {
            return Err(crate::error::Error::Train(
                "learning-rate sweep needs at least one sample".to_string(),
            ));
        }

        let first_block = self.first_trainable_block;
        let mut optimizer = AdamW::new(
            self.model.trainable_parameters_mut(first_block),
            lrs.first().copied().unwrap_or(0.0),
        );

        let mut losses = Vec::with_capacity(lrs.len());
        for &lr in lrs {
            let sample = &samples[rng.gen_range(0..samples.len())];
            let logits = self.model.forward_logits(&sample.ids);
            let loss = bce_with_logits_loss(&logits, &sample.targets);
            let loss_t = Tensor::new(&[loss], &[1]);
            loss_t.backward();

            optimizer.set_lr(lr);
            optimizer.step();
            optimizer.zero_grad();
            losses.push(loss);
        }
        Ok(losses)
    }

    /// Underlying model, for checkpoint serialization.
    #[must_use]
    pub fn model(&self) -> &EncoderClassifier {
        &self.model
    }

    /// Underlying model, for checkpoint restore.
    pub fn model_mut(&mut self) -> &mut EncoderClassifier {
        &mut self.model
    }
}

/// Fisher-Yates shuffle driven by an LCG, deterministic per seed.
fn shuffle(indices: &mut [usize], seed: u64) {
    let mut rng_state = seed;
    for i in (1..indices.len()).rev() {
        rng_state = rng_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let j = (rng_state >> 33) as usize % (i + 1);
        indices.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use std::path::Path;

    fn tiny_learner(num_labels: usize) -> Learner {
        let dir = std::env::temp_dir();
        let cfg = test_config(Path::new("data.jsonl"), "exp", &dir);
        Learner::new(&cfg, num_labels).unwrap()
    }

    fn toy_samples(n: usize, labels: usize) -> Vec<TrainSample> {
        (0..n)
            .map(|i| {
                let mut targets = vec![0.0; labels];
                targets[i % labels] = 1.0;
                TrainSample { ids: vec![(i % 200) as u32 + 1, 40, 41], targets }
            })
            .collect()
    }

    #[test]
    fn test_bce_loss_is_finite_and_nonnegative() {
        let logits = Tensor::new(&[0.5, -2.0, 3.0], &[1, 3]);
        let loss = bce_with_logits_loss(&logits, &[1.0, 0.0, 1.0]);
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_bce_loss_prefers_correct_logits() {
        let confident_right = Tensor::new(&[5.0, -5.0], &[1, 2]);
        let confident_wrong = Tensor::new(&[-5.0, 5.0], &[1, 2]);
        let t = [1.0, 0.0];
        assert!(
            bce_with_logits_loss(&confident_right, &t) < bce_with_logits_loss(&confident_wrong, &t)
        );
    }

    #[test]
    fn test_fit_runs_exact_epoch_count() {
        let mut learner = tiny_learner(3);
        let samples = toy_samples(8, 3);
        let loss = learner
            .fit_one_cycle(&samples, 2, 1e-4, MomentumSpan::default(), 42, LogLevel::Quiet)
            .unwrap();
        assert!(loss.is_finite());
    }

    #[test]
    fn test_freeze_to_trailing_blocks() {
        let mut learner = tiny_learner(2);
        learner.freeze_to(-1);
        let n_blocks = learner.model.num_blocks();
        assert_eq!(learner.first_trainable_block(), Some(n_blocks - 1));

        // Deeper than the stack clamps to the whole stack
        learner.freeze_to(-64);
        assert_eq!(learner.first_trainable_block(), Some(0));
    }

    #[test]
    fn test_predict_scores_in_unit_interval() {
        let learner = tiny_learner(4);
        let scores = learner.predict_scores(&[10, 20, 30]);
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_shuffle_deterministic_and_seed_sensitive() {
        let mut a: Vec<usize> = (0..32).collect();
        let mut b: Vec<usize> = (0..32).collect();
        let mut c: Vec<usize> = (0..32).collect();
        shuffle(&mut a, 7);
        shuffle(&mut b, 7);
        shuffle(&mut c, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
