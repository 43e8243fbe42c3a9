//! Threshold-based multi-label evaluation
//!
//! Micro-averaged F1 at a fixed decision threshold plus a per-label
//! precision/recall/F1/support report table.

use crate::cli::logging::{log, LogLevel};

/// Scores at or above this threshold count as predicted-positive.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Per-label tallies for one column of the label matrix.
#[derive(Debug, Clone, Copy, Default)]
struct LabelCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl LabelCounts {
    fn precision(&self) -> f64 {
        if self.tp + self.fp > 0 {
            self.tp as f64 / (self.tp + self.fp) as f64
        } else {
            0.0
        }
    }

    fn recall(&self) -> f64 {
        if self.tp + self.fn_ > 0 {
            self.tp as f64 / (self.tp + self.fn_) as f64
        } else {
            0.0
        }
    }

    fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    fn support(&self) -> usize {
        self.tp + self.fn_
    }
}

fn count_per_label(y_true: &[Vec<f32>], y_pred: &[Vec<f32>]) -> Vec<LabelCounts> {
    let width = y_true.first().map_or(0, Vec::len);
    let mut counts = vec![LabelCounts::default(); width];
    for (truth, scores) in y_true.iter().zip(y_pred.iter()) {
        for col in 0..width {
            let actual = truth[col] > 0.5;
            let predicted = scores[col] >= DECISION_THRESHOLD;
            match (actual, predicted) {
                (true, true) => counts[col].tp += 1,
                (false, true) => counts[col].fp += 1,
                (true, false) => counts[col].fn_ += 1,
                (false, false) => {}
            }
        }
    }
    counts
}

/// Micro-averaged F1 over all cells of the padded matrices.
#[must_use]
pub fn micro_f1(y_true: &[Vec<f32>], y_pred: &[Vec<f32>]) -> f64 {
    let counts = count_per_label(y_true, y_pred);
    let tp: usize = counts.iter().map(|c| c.tp).sum();
    let fp: usize = counts.iter().map(|c| c.fp).sum();
    let fn_: usize = counts.iter().map(|c| c.fn_).sum();

    let p = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
    let r = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
    if p + r > 0.0 {
        2.0 * p * r / (p + r)
    } else {
        0.0
    }
}

/// Render a per-label classification report table.
#[must_use]
pub fn classification_report(
    y_true: &[Vec<f32>],
    y_pred: &[Vec<f32>],
    label_names: &[String],
) -> String {
    let counts = count_per_label(y_true, y_pred);
    let mut out = String::new();

    out.push_str(&format!(
        "{:>24} {:>10} {:>10} {:>10} {:>10}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    out.push_str(&format!("{}\n", "-".repeat(68)));

    for (i, c) in counts.iter().enumerate() {
        let name = label_names
            .get(i)
            .map_or_else(|| format!("label {i}"), Clone::clone);
        let short = if name.len() > 24 { &name[..24] } else { name.as_str() };
        out.push_str(&format!(
            "{:>24} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
            short,
            c.precision(),
            c.recall(),
            c.f1(),
            c.support(),
        ));
    }

    out.push_str(&format!("{}\n", "-".repeat(68)));
    out.push_str(&format!("micro F1: {:.4}\n", micro_f1(y_true, y_pred)));
    out
}

/// The validation-split scalar evaluation: micro-F1 at the decision
/// threshold, with the full report emitted at verbose level.
#[must_use]
pub fn basic_evaluation(
    y_true: &[Vec<f32>],
    y_pred: &[Vec<f32>],
    label_names: &[String],
    level: LogLevel,
) -> f64 {
    let f1 = micro_f1(y_true, y_pred);
    log(
        level,
        LogLevel::Verbose,
        &classification_report(y_true, y_pred, label_names),
    );
    f1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micro_f1_perfect_predictions() {
        let y_true = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let y_pred = vec![vec![0.9, 0.1], vec![0.2, 0.8]];
        assert!((micro_f1(&y_true, &y_pred) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_micro_f1_hand_computed() {
        // tp=1 (doc0 col0), fp=1 (doc1 col0), fn=1 (doc1 col1)
        let y_true = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let y_pred = vec![vec![0.9, 0.1], vec![0.9, 0.1]];
        let p = 0.5;
        let r = 0.5;
        let expected = 2.0 * p * r / (p + r);
        assert!((micro_f1(&y_true, &y_pred) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_micro_f1_all_negative_is_zero() {
        let y_true = vec![vec![0.0, 0.0]];
        let y_pred = vec![vec![0.0, 0.0]];
        assert_eq!(micro_f1(&y_true, &y_pred), 0.0);
    }

    #[test]
    fn test_report_includes_each_label() {
        let y_true = vec![vec![1.0, 0.0]];
        let y_pred = vec![vec![0.9, 0.1]];
        let names = vec!["alpha".to_string(), "beta".to_string()];
        let report = classification_report(&y_true, &y_pred, &names);
        assert!(report.contains("alpha"));
        assert!(report.contains("beta"));
        assert!(report.contains("micro F1"));
    }
}
