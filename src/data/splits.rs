//! Split membership lists
//!
//! Three newline-delimited id files assign documents to train/validation/test.
//! A missing or unreadable file is reported and the run degrades to every
//! document carrying no split rather than aborting.

use crate::cli::logging::{log, LogLevel};
use std::collections::HashSet;
use std::path::Path;

pub const TRAIN_FILENAME: &str = "train.txt";
pub const VALIDATION_FILENAME: &str = "validation.txt";
pub const TEST_FILENAME: &str = "test.txt";

/// Document-id membership sets for the three splits.
#[derive(Debug, Clone, Default)]
pub struct SplitLists {
    train: HashSet<String>,
    validation: HashSet<String>,
    test: HashSet<String>,
}

impl SplitLists {
    /// Empty lists: every document resolves to no split.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the three id lists from `dir`.
    ///
    /// Any read failure logs the problem and returns empty lists — the
    /// tolerance policy from the original pipeline: a bad split directory
    /// demotes every document to "no split" instead of killing the run.
    #[must_use]
    pub fn load(dir: &Path, level: LogLevel) -> Self {
        match Self::try_load(dir) {
            Ok(lists) => lists,
            Err(e) => {
                log(
                    level,
                    LogLevel::Normal,
                    &format!("warning: split lists unusable ({e}); all documents get no split"),
                );
                Self::empty()
            }
        }
    }

    fn try_load(dir: &Path) -> std::io::Result<Self> {
        Ok(Self {
            train: read_id_list(&dir.join(TRAIN_FILENAME))?,
            validation: read_id_list(&dir.join(VALIDATION_FILENAME))?,
            test: read_id_list(&dir.join(TEST_FILENAME))?,
        })
    }

    /// Which split an id belongs to; train wins over validation over test
    /// when an id appears in more than one list.
    #[must_use]
    pub fn split_of(&self, doc_id: &str) -> crate::data::corpus::Split {
        use crate::data::corpus::Split;
        if self.train.contains(doc_id) {
            Split::Train
        } else if self.validation.contains(doc_id) {
            Split::Validation
        } else if self.test.contains(doc_id) {
            Split::Test
        } else {
            Split::NoSplit
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.validation.is_empty() && self.test.is_empty()
    }
}

fn read_id_list(path: &Path) -> std::io::Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
