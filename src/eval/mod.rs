//! Evaluation: threshold metrics, ranking metrics, and the per-cycle engine

pub mod basic;
pub mod engine;
pub mod ranking;

pub use basic::{basic_evaluation, classification_report, micro_f1, DECISION_THRESHOLD};
pub use engine::{evaluate_cycle, pad_zero_shot, CycleMetrics, SplitEval, K_MAX};
pub use ranking::{ndcg_at_k, precision_at_k};
