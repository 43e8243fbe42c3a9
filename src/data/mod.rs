//! Dataset ingestion, split assignment, and the label vocabulary

pub mod corpus;
pub mod labels;
pub mod splits;

pub use corpus::{load_corpus, Corpus, Document, Split};
pub use labels::{split_labels, LabelSnapshot, LabelVocab, LABEL_DELIM};
pub use splits::SplitLists;
