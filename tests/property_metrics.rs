//! Property tests for metric and vocabulary invariants
//!
//! - ranking metrics bounded to [0, 1], never NaN
//! - zero-shot padding is lossless for metrics on the trained columns
//! - label vocabulary only grows, idempotently
//! - cycle schedule overrun-extension law

use afinar::config::CycleSchedule;
use afinar::data::LabelVocab;
use afinar::eval::{micro_f1, ndcg_at_k, precision_at_k};
use approx::relative_eq;
use proptest::collection::vec;
use proptest::prelude::*;

/// A (truth, scores) matrix pair with matching dimensions.
fn matrix_pair(
    max_rows: usize,
    max_cols: usize,
) -> impl Strategy<Value = (Vec<Vec<f32>>, Vec<Vec<f32>>)> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
        let truth = vec(vec(prop::bool::ANY.prop_map(|b| if b { 1.0f32 } else { 0.0 }), cols), rows);
        let scores = vec(vec(0.0f32..1.0, cols), rows);
        (truth, scores)
    })
}

proptest! {
    #[test]
    fn prop_precision_at_k_bounded((y_true, y_pred) in matrix_pair(12, 8), k in 1usize..20) {
        let p = precision_at_k(&y_true, &y_pred, k);
        prop_assert!((0.0..=1.0).contains(&p), "precision@{k} = {p} out of [0, 1]");
        prop_assert!(!p.is_nan());
    }

    #[test]
    fn prop_ndcg_at_k_bounded((y_true, y_pred) in matrix_pair(12, 8), k in 1usize..20) {
        let n = ndcg_at_k(&y_true, &y_pred, k);
        prop_assert!((0.0..=1.0).contains(&n), "nDCG@{k} = {n} out of [0, 1]");
        prop_assert!(!n.is_nan());
    }

    #[test]
    fn prop_micro_f1_bounded((y_true, y_pred) in matrix_pair(12, 8)) {
        let f1 = micro_f1(&y_true, &y_pred);
        prop_assert!((0.0..=1.0).contains(&f1));
        prop_assert!(!f1.is_nan());
    }

    #[test]
    fn prop_perfect_ranking_has_ndcg_one((y_true, _) in matrix_pair(10, 6)) {
        // Predicting the truth itself is an ideal ranking wherever any label
        // is relevant
        let any_relevant = y_true.iter().filter(|row| row.iter().any(|&t| t > 0.5)).count();
        prop_assume!(any_relevant == y_true.len());
        let n = ndcg_at_k(&y_true, &y_true, 6);
        prop_assert!(relative_eq!(n, 1.0, epsilon = 1e-9), "nDCG = {n}");
    }

    // Zero-shot padding law: appending zero columns to the predictions (and
    // truth columns with no relevant labels) changes nothing about metrics
    // computed over the trained columns.
    #[test]
    fn prop_zero_shot_padding_is_lossless(
        (y_true, y_pred) in matrix_pair(10, 6),
        pad in 1usize..5,
        k in 1usize..20,
    ) {
        let p_before = precision_at_k(&y_true, &y_pred, k);
        let n_before = ndcg_at_k(&y_true, &y_pred, k);
        let f_before = micro_f1(&y_true, &y_pred);

        let widen = |m: &[Vec<f32>]| -> Vec<Vec<f32>> {
            m.iter()
                .map(|row| {
                    let mut r = row.clone();
                    r.extend(std::iter::repeat(0.0).take(pad));
                    r
                })
                .collect()
        };
        let y_true_padded = widen(&y_true);
        let y_pred_padded = widen(&y_pred);

        prop_assert_eq!(precision_at_k(&y_true_padded, &y_pred_padded, k), p_before);
        prop_assert_eq!(ndcg_at_k(&y_true_padded, &y_pred_padded, k), n_before);
        prop_assert_eq!(micro_f1(&y_true_padded, &y_pred_padded), f_before);
    }

    #[test]
    fn prop_vocab_growth_is_monotone_and_idempotent(
        labels in vec("[a-e]{1,2}", 1..30),
    ) {
        let mut vocab = LabelVocab::new();
        let mut sizes = Vec::new();
        for label in &labels {
            vocab.index_of(label);
            sizes.push(vocab.len());
        }
        // Size never decreases
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));

        // Indexing everything again changes nothing and resolves identically
        let len_before = vocab.len();
        let indices: Vec<usize> = labels.iter().map(|l| vocab.index_of(l)).collect();
        prop_assert_eq!(vocab.len(), len_before);
        let again: Vec<usize> = labels.iter().map(|l| vocab.index_of(l)).collect();
        prop_assert_eq!(indices, again);
    }

    #[test]
    fn prop_schedule_overrun_resolves_to_last_triple(
        iterations in vec(1usize..20, 1..5),
        lrs in vec(1e-6f32..1e-2, 1..5),
        unfreeze in vec(-12i64..4, 1..5),
        cycle in 1usize..40,
    ) {
        let schedule = CycleSchedule::new(iterations.clone(), lrs.clone(), unfreeze.clone()).unwrap();
        let spec = schedule.resolve(cycle);

        let pick = |len: usize| (cycle - 1).min(len - 1);
        prop_assert_eq!(spec.iterations, iterations[pick(iterations.len())]);
        prop_assert_eq!(spec.unfreeze_to, unfreeze[pick(unfreeze.len())]);
        prop_assert!((spec.max_lr - lrs[pick(lrs.len())]).abs() < 1e-12);

        // Far past the end, the last triple is always in effect
        let far = schedule.resolve(cycle + 100);
        prop_assert_eq!(far.iterations, *iterations.last().unwrap());
        prop_assert_eq!(far.unfreeze_to, *unfreeze.last().unwrap());
    }
}
