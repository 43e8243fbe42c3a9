//! Cycle training and the learning-rate probe

pub mod cycle;
pub mod pipeline;
pub mod probe;

pub use cycle::run_cycle;
pub use probe::{reseed, run_probe};
