//! Ranking metrics over multi-label score matrices
//!
//! Both metrics rank a document's predicted scores in descending order and
//! judge the top k against binary relevance from the ground-truth row, then
//! average over documents. A document with no relevant labels contributes 0.

/// A label counts as relevant when its ground-truth cell exceeds this.
const RELEVANCE_THRESHOLD: f32 = 0.5;

/// Column indices of `scores` ranked by descending score; ties keep the
/// lower column first so rankings are deterministic.
fn rank_descending(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// precision@k: fraction of the top-k ranked labels present in ground truth,
/// averaged over documents.
#[must_use]
pub fn precision_at_k(y_true: &[Vec<f32>], y_pred: &[Vec<f32>], k: usize) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len(), "row count mismatch");
    if y_true.is_empty() || k == 0 {
        return 0.0;
    }

    let mut total = 0.0f64;
    for (truth, scores) in y_true.iter().zip(y_pred.iter()) {
        let hits = rank_descending(scores)
            .into_iter()
            .take(k)
            .filter(|&col| truth[col] > RELEVANCE_THRESHOLD)
            .count();
        total += hits as f64 / k as f64;
    }
    total / y_true.len() as f64
}

/// nDCG@k with binary relevance, normalized against the ideal ranking and
/// averaged over documents.
#[must_use]
pub fn ndcg_at_k(y_true: &[Vec<f32>], y_pred: &[Vec<f32>], k: usize) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len(), "row count mismatch");
    if y_true.is_empty() || k == 0 {
        return 0.0;
    }

    let mut total = 0.0f64;
    for (truth, scores) in y_true.iter().zip(y_pred.iter()) {
        let n_relevant = truth.iter().filter(|&&t| t > RELEVANCE_THRESHOLD).count();
        if n_relevant == 0 {
            continue;
        }

        let dcg: f64 = rank_descending(scores)
            .into_iter()
            .take(k)
            .enumerate()
            .filter(|&(_, col)| truth[col] > RELEVANCE_THRESHOLD)
            .map(|(rank, _)| 1.0 / ((rank + 2) as f64).log2())
            .sum();

        let ideal: f64 = (0..n_relevant.min(k))
            .map(|rank| 1.0 / ((rank + 2) as f64).log2())
            .sum();

        total += dcg / ideal;
    }
    total / y_true.len() as f64
}
