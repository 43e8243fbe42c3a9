//! Append-only label vocabulary
//!
//! Maps label strings to dense column indices in first-seen order. Indices
//! are never reused or renumbered; the vocabulary only grows. Downstream
//! readers take a [`LabelSnapshot`] instead of the live map so column counts
//! cannot shift under them mid-run.

use crate::data::corpus::Document;
use std::collections::HashMap;

/// Delimiter between labels inside a document's raw label string.
pub const LABEL_DELIM: char = ';';

/// Ordered label -> column-index map. Append-only.
#[derive(Debug, Clone, Default)]
pub struct LabelVocab {
    index: HashMap<String, usize>,
    ordered: Vec<String>,
}

impl LabelVocab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from the training split only.
    ///
    /// These are the columns the model is constructed over; evaluation-only
    /// labels join later via [`LabelVocab::grow_from_docs`].
    #[must_use]
    pub fn from_training_docs(docs: &[Document]) -> Self {
        let mut vocab = Self::new();
        for doc in docs.iter().filter(|d| d.split.is_train()) {
            for label in split_labels(&doc.labels_raw) {
                vocab.index_of(label);
            }
        }
        vocab
    }

    /// Column index for `label`, assigning the next free index on first sight.
    pub fn index_of(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.ordered.len();
        self.index.insert(label.to_string(), idx);
        self.ordered.push(label.to_string());
        idx
    }

    /// Index lookup without growth.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Scan every document's label string and index every unseen label.
    ///
    /// Idempotent: a second pass over the same documents changes nothing.
    /// Returns the number of labels added.
    pub fn grow_from_docs(&mut self, docs: &[Document]) -> usize {
        let before = self.len();
        for doc in docs {
            for label in split_labels(&doc.labels_raw) {
                self.index_of(label);
            }
        }
        self.len() - before
    }

    /// Number of known labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Known labels in index order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.ordered
    }

    /// Freeze the current column list.
    #[must_use]
    pub fn snapshot(&self) -> LabelSnapshot {
        LabelSnapshot {
            columns: self.ordered.clone(),
            index: self.index.clone(),
        }
    }
}

/// Immutable view of the vocabulary at a point in time.
///
/// Evaluation consumes snapshots only; growth after a snapshot is taken is
/// invisible to holders of that snapshot.
#[derive(Debug, Clone)]
pub struct LabelSnapshot {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Multi-hot row over this snapshot's columns for one raw label string.
    #[must_use]
    pub fn multi_hot(&self, labels_raw: &str) -> Vec<f32> {
        let mut row = vec![0.0f32; self.columns.len()];
        for label in split_labels(labels_raw) {
            if let Some(idx) = self.index_of(label) {
                row[idx] = 1.0;
            }
        }
        row
    }
}

/// Split a raw label string on the delimiter, dropping empty fragments.
pub fn split_labels(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LABEL_DELIM).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::corpus::Split;

    fn doc(id: &str, labels: &str, split: Split) -> Document {
        Document {
            doc_id: id.to_string(),
            text: "text".to_string(),
            labels_raw: labels.to_string(),
            split,
        }
    }

    #[test]
    fn test_index_of_is_idempotent() {
        let mut vocab = LabelVocab::new();
        let a = vocab.index_of("alpha");
        let b = vocab.index_of("beta");
        assert_eq!(vocab.index_of("alpha"), a);
        assert_eq!(vocab.index_of("beta"), b);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn test_indices_first_seen_order() {
        let mut vocab = LabelVocab::new();
        assert_eq!(vocab.index_of("c"), 0);
        assert_eq!(vocab.index_of("a"), 1);
        assert_eq!(vocab.index_of("b"), 2);
        assert_eq!(vocab.labels(), &["c", "a", "b"]);
    }

    #[test]
    fn test_grow_only_appends() {
        let docs = vec![
            doc("1", "x;y", Split::Train),
            doc("2", "y;z", Split::Test),
        ];
        let mut vocab = LabelVocab::from_training_docs(&docs);
        assert_eq!(vocab.len(), 2);
        let x = vocab.get("x").unwrap();

        let added = vocab.grow_from_docs(&docs);
        assert_eq!(added, 1);
        assert_eq!(vocab.get("x").unwrap(), x);
        assert_eq!(vocab.get("z").unwrap(), 2);

        // Re-scanning after growth performs no further mutation
        assert_eq!(vocab.grow_from_docs(&docs), 0);
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut vocab = LabelVocab::new();
        vocab.index_of("a");
        let snap = vocab.snapshot();
        vocab.index_of("b");
        assert_eq!(snap.len(), 1);
        assert_eq!(vocab.len(), 2);
        assert!(snap.index_of("b").is_none());
    }

    #[test]
    fn test_multi_hot_ignores_unknown_labels() {
        let mut vocab = LabelVocab::new();
        vocab.index_of("a");
        vocab.index_of("b");
        let snap = vocab.snapshot();
        assert_eq!(snap.multi_hot("b;nope;a"), vec![1.0, 1.0]);
        assert_eq!(snap.multi_hot(""), vec![0.0, 0.0]);
    }

    #[test]
    fn test_split_labels_trims_and_drops_empty() {
        let parts: Vec<&str> = split_labels(" a ;; b ;").collect();
        assert_eq!(parts, vec!["a", "b"]);
    }
}
