//! One-cycle learning rate schedule
//!
//! Single cosine ramp from `max_lr / DIV_FACTOR` up to `max_lr` over the
//! first `PCT_START` of steps, then cosine anneal down to
//! `max_lr / (DIV_FACTOR * FINAL_DIV)`. Momentum runs the inverse leg:
//! `high -> low` during the ramp, `low -> high` during the anneal.

use super::LrScheduler;
use std::f32::consts::PI;

/// Initial divisor: the schedule starts at `max_lr / DIV_FACTOR`.
const DIV_FACTOR: f32 = 25.0;
/// Final divisor applied on top of `DIV_FACTOR` at the end of the anneal.
const FINAL_DIV: f32 = 1e4;
/// Fraction of total steps spent ramping up.
const PCT_START: f32 = 0.3;

/// Momentum bounds for the inverse momentum leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumSpan {
    /// Momentum at the start and end of the cycle
    pub high: f32,
    /// Momentum at peak learning rate
    pub low: f32,
}

impl Default for MomentumSpan {
    fn default() -> Self {
        // The fixed span used by every training cycle
        Self { high: 0.8, low: 0.7 }
    }
}

/// One-cycle learning rate scheduler with a paired momentum leg.
pub struct OneCycleLr {
    max_lr: f32,
    moms: MomentumSpan,
    ramp_steps: usize,
    total_steps: usize,
    current_step: usize,
}

impl OneCycleLr {
    /// Create a scheduler covering `total_steps` optimizer steps.
    pub fn new(max_lr: f32, total_steps: usize, moms: MomentumSpan) -> Self {
        let total_steps = total_steps.max(1);
        let ramp_steps = ((total_steps as f32) * PCT_START).round() as usize;
        Self {
            max_lr,
            moms,
            ramp_steps: ramp_steps.clamp(1, total_steps),
            total_steps,
            current_step: 0,
        }
    }

    /// Cosine interpolation from `a` to `b` at progress `t` in [0, 1].
    fn anneal(a: f32, b: f32, t: f32) -> f32 {
        let cos_out = 0.5 * (1.0 + (PI * t).cos());
        b + (a - b) * cos_out
    }

    /// Progress through the current phase: (ramping, t).
    fn phase(&self) -> (bool, f32) {
        if self.current_step < self.ramp_steps {
            (true, self.current_step as f32 / self.ramp_steps as f32)
        } else {
            let decay_steps = (self.total_steps - self.ramp_steps).max(1);
            let t = (self.current_step - self.ramp_steps) as f32 / decay_steps as f32;
            (false, t.min(1.0))
        }
    }
}

impl LrScheduler for OneCycleLr {
    fn get_lr(&self) -> f32 {
        let start_lr = self.max_lr / DIV_FACTOR;
        let end_lr = self.max_lr / (DIV_FACTOR * FINAL_DIV);
        match self.phase() {
            (true, t) => Self::anneal(start_lr, self.max_lr, t),
            (false, t) => Self::anneal(self.max_lr, end_lr, t),
        }
    }

    fn get_momentum(&self) -> f32 {
        match self.phase() {
            (true, t) => Self::anneal(self.moms.high, self.moms.low, t),
            (false, t) => Self::anneal(self.moms.low, self.moms.high, t),
        }
    }

    fn step(&mut self) {
        if self.current_step < self.total_steps {
            self.current_step += 1;
        }
    }
}
