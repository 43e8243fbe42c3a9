//! Learning rate scheduling for cycle training

mod one_cycle;

pub use one_cycle::{MomentumSpan, OneCycleLr};

/// Learning rate scheduler trait
pub trait LrScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Get the current momentum
    fn get_momentum(&self) -> f32;

    /// Step the scheduler (called after each batch)
    fn step(&mut self);
}
