//! Per-cycle evaluation
//!
//! Assembles (ground truth, predicted score) matrices for the validation and
//! test splits, reconciles the column-count shortfall left by zero-shot
//! labels, and aggregates the cycle's metrics row.

use crate::cli::logging::{log, LogLevel};
use crate::data::{Corpus, Document, LabelSnapshot, Split};
use crate::error::{Error, Result};
use crate::eval::basic::basic_evaluation;
use crate::eval::ranking::{ndcg_at_k, precision_at_k};
use crate::model::Learner;
use crate::results::ROW_WIDTH;

/// Ranking metrics are computed for k = 1..=K_MAX.
pub const K_MAX: usize = 19;

/// Matrices for one split, one row per document.
#[derive(Debug, Clone)]
pub struct SplitEval {
    /// Ground truth over the full (possibly grown) vocabulary
    pub y_true: Vec<Vec<f32>>,
    /// Predicted scores; trained columns only until padding
    pub y_pred: Vec<Vec<f32>>,
}

impl SplitEval {
    /// Column shortfall between ground truth and predictions.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        let truth = self.y_true.first().map_or(0, Vec::len);
        let pred = self.y_pred.first().map_or(0, Vec::len);
        truth.saturating_sub(pred)
    }
}

/// One cycle's aggregate metrics.
#[derive(Debug, Clone)]
pub struct CycleMetrics {
    /// Micro-F1 on the validation split
    pub f1: f64,
    /// precision@k on the test split, k ascending from 1
    pub precision_at: Vec<f64>,
    /// nDCG@k on the test split, k ascending from 1
    pub ndcg_at: Vec<f64>,
}

impl CycleMetrics {
    /// Flatten to the ledger row layout: `F1, p@1..19, nDCG@1..19`.
    #[must_use]
    pub fn to_row(&self) -> Vec<f64> {
        let mut row = Vec::with_capacity(ROW_WIDTH);
        row.push(self.f1);
        row.extend_from_slice(&self.precision_at);
        row.extend_from_slice(&self.ndcg_at);
        row
    }
}

/// Build the (truth, score) matrices for one split.
fn assemble_split(learner: &Learner, docs: &[&Document], snapshot: &LabelSnapshot) -> SplitEval {
    let mut y_true = Vec::with_capacity(docs.len());
    let mut y_pred = Vec::with_capacity(docs.len());
    for doc in docs {
        y_true.push(snapshot.multi_hot(&doc.labels_raw));
        y_pred.push(learner.predict_scores(&learner.encode(&doc.text)));
    }
    SplitEval { y_true, y_pred }
}

/// Right-pad every prediction row with `shortfall` zero columns.
///
/// Zero-shot labels can never be ranked above a predicted label; this is the
/// "never predict zero-shot labels" floor policy, not an error path.
pub fn pad_zero_shot(split: &mut SplitEval, shortfall: usize) {
    if shortfall == 0 {
        return;
    }
    for row in &mut split.y_pred {
        row.extend(std::iter::repeat(0.0).take(shortfall));
    }
}

/// Evaluate the learner's current weights against validation and test.
///
/// The caller hands in the live learner straight from cycle training, the
/// corpus, and the full post-growth vocabulary snapshot.
///
/// # Errors
/// `Error::Eval` when a split is empty — the degenerate case metric
/// primitives cannot average over. The failure is scoped to this cycle's
/// evaluation; saved checkpoints stay valid.
pub fn evaluate_cycle(
    learner: &Learner,
    corpus: &Corpus,
    snapshot: &LabelSnapshot,
    level: LogLevel,
) -> Result<CycleMetrics> {
    let val_docs = corpus.of_split(Split::Validation);
    let test_docs = corpus.of_split(Split::Test);
    if val_docs.is_empty() || test_docs.is_empty() {
        return Err(Error::Eval(format!(
            "cannot evaluate: validation split has {} documents, test split has {}",
            val_docs.len(),
            test_docs.len()
        )));
    }

    let mut val = assemble_split(learner, &val_docs, snapshot);
    let mut test = assemble_split(learner, &test_docs, snapshot);

    // Zero-shot labels appear in ground truth only; the shortfall is the
    // same for every split because all predictions share the trained width.
    let shortfall = val.shortfall();
    pad_zero_shot(&mut val, shortfall);
    pad_zero_shot(&mut test, shortfall);
    if shortfall > 0 {
        log(
            level,
            LogLevel::Verbose,
            &format!("zero-shot padding: {shortfall} column(s) appended to predictions"),
        );
    }

    let f1 = basic_evaluation(&val.y_true, &val.y_pred, snapshot.columns(), level);

    let mut precision_at = Vec::with_capacity(K_MAX);
    let mut ndcg_at = Vec::with_capacity(K_MAX);
    for k in 1..=K_MAX {
        precision_at.push(precision_at_k(&test.y_true, &test.y_pred, k));
        ndcg_at.push(ndcg_at_k(&test.y_true, &test.y_pred, k));
    }

    log(
        level,
        LogLevel::Normal,
        &format!(
            "  eval | F1 {f1:.4} | p@1 {:.4} | p@5 {:.4} | nDCG@5 {:.4}",
            precision_at[0], precision_at[4], ndcg_at[4]
        ),
    );

    Ok(CycleMetrics { f1, precision_at, ndcg_at })
}
