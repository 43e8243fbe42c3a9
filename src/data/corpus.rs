//! Dataset ingestion
//!
//! Loads the tabular dataset (CSV via alimentar's Arrow reader, JSONL via
//! serde for fixtures), lowercases text for uncased runs, and assigns each
//! document its split from the membership lists exactly once.

use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::data::splits::SplitLists;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Dataset column holding the document text.
pub const TEXT_FIELD: &str = "text";
/// Dataset column holding the document identifier.
pub const FILE_ID_FIELD: &str = "celex_id";

/// Split membership of one document. Assigned at load, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Validation,
    Test,
    NoSplit,
}

impl Split {
    #[must_use]
    pub fn is_train(&self) -> bool {
        matches!(self, Split::Train)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "val",
            Split::Test => "test",
            Split::NoSplit => "no split",
        }
    }
}

/// One dataset row.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: String,
    pub text: String,
    /// Semicolon-delimited label string, untouched from the dataset
    pub labels_raw: String,
    pub split: Split,
}

/// The loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    #[must_use]
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    #[must_use]
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents belonging to one split, in dataset order.
    #[must_use]
    pub fn of_split(&self, split: Split) -> Vec<&Document> {
        self.docs.iter().filter(|d| d.split == split).collect()
    }

    /// Count per split, in (train, validation, test, no-split) order.
    #[must_use]
    pub fn split_counts(&self) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for d in &self.docs {
            match d.split {
                Split::Train => counts.0 += 1,
                Split::Validation => counts.1 += 1,
                Split::Test => counts.2 += 1,
                Split::NoSplit => counts.3 += 1,
            }
        }
        counts
    }
}

/// Raw JSONL row; mirrors the CSV column set for fixture datasets.
#[derive(Debug, Deserialize)]
struct JsonlRow {
    celex_id: String,
    text: String,
    #[serde(flatten)]
    rest: std::collections::HashMap<String, serde_json::Value>,
}

/// Load the dataset named by the config and assign splits.
///
/// Routes on file extension: `.csv` through alimentar's Arrow reader,
/// `.jsonl`/`.json` through the serde line loader.
///
/// # Errors
/// Returns `Error::Data` if the file cannot be read, the format is
/// unsupported, or a required column is missing.
pub fn load_corpus(config: &RunConfig, lists: &SplitLists, level: LogLevel) -> Result<Corpus> {
    let path = &config.dataset_path;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let label_col = config.label_column.as_str();
    let rows = match ext.as_str() {
        "csv" => load_csv_rows(path, label_col)?,
        "jsonl" | "json" => load_jsonl_rows(path, label_col)?,
        other => {
            return Err(Error::Data(format!(
                "unsupported dataset format '{other}' for {}",
                path.display()
            )))
        }
    };

    let lowercase = !config.cased;
    let docs: Vec<Document> = rows
        .into_iter()
        .map(|(doc_id, text, labels_raw)| {
            let text = if lowercase { text.to_lowercase() } else { text };
            let split = lists.split_of(&doc_id);
            Document { doc_id, text, labels_raw, split }
        })
        .collect();

    let corpus = Corpus::new(docs);
    let (train, val, test, none) = corpus.split_counts();
    log(
        level,
        LogLevel::Normal,
        &format!(
            "loaded {} documents (train {train}, val {val}, test {test}, no split {none})",
            corpus.len()
        ),
    );
    Ok(corpus)
}

/// (doc_id, text, labels_raw) triples from a CSV file.
fn load_csv_rows(path: &Path, label_col: &str) -> Result<Vec<(String, String, String)>> {
    use alimentar::{ArrowDataset, Dataset};

    let dataset = ArrowDataset::from_csv(path)
        .map_err(|e| Error::Data(format!("failed to load csv {}: {e}", path.display())))?;

    let schema = dataset.schema();
    let id_idx = schema
        .index_of(FILE_ID_FIELD)
        .map_err(|_| Error::Data(format!("dataset has no '{FILE_ID_FIELD}' column")))?;
    let text_idx = schema
        .index_of(TEXT_FIELD)
        .map_err(|_| Error::Data(format!("dataset has no '{TEXT_FIELD}' column")))?;
    let label_idx = schema
        .index_of(label_col)
        .map_err(|_| Error::Data(format!("dataset has no '{label_col}' column")))?;

    let mut rows = Vec::with_capacity(dataset.len());
    for record_batch in dataset.iter() {
        let ids = arrow_array_to_strings(record_batch.column(id_idx))?;
        let texts = arrow_array_to_strings(record_batch.column(text_idx))?;
        let labels = arrow_array_to_strings(record_batch.column(label_idx))?;
        if ids.len() != texts.len() || ids.len() != labels.len() {
            return Err(Error::Data("ragged record batch in csv dataset".to_string()));
        }
        for ((id, text), label) in ids.into_iter().zip(texts).zip(labels) {
            rows.push((id, text, label));
        }
    }
    Ok(rows)
}

/// Convert an Arrow string array to owned strings.
fn arrow_array_to_strings(array: &arrow::array::ArrayRef) -> Result<Vec<String>> {
    use arrow::array::{Array, LargeStringArray, StringArray};
    use arrow::datatypes::DataType;

    match array.data_type() {
        DataType::Utf8 => {
            let arr = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::Data("failed to downcast StringArray".to_string()))?;
            Ok((0..arr.len())
                .map(|i| if arr.is_null(i) { String::new() } else { arr.value(i).to_string() })
                .collect())
        }
        DataType::LargeUtf8 => {
            let arr = array
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .ok_or_else(|| Error::Data("failed to downcast LargeStringArray".to_string()))?;
            Ok((0..arr.len())
                .map(|i| if arr.is_null(i) { String::new() } else { arr.value(i).to_string() })
                .collect())
        }
        other => Err(Error::Data(format!(
            "unsupported Arrow data type for text column: {other:?}"
        ))),
    }
}

/// (doc_id, text, labels_raw) triples from a JSONL file.
fn load_jsonl_rows(path: &Path, label_col: &str) -> Result<Vec<(String, String, String)>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Data(format!("failed to read {}: {e}", path.display())))?;

    let mut rows = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: JsonlRow = serde_json::from_str(line).map_err(|e| {
            Error::Data(format!("invalid JSONL at line {}: {e}", line_num + 1))
        })?;
        let labels = row
            .rest
            .get(label_col)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::Data(format!(
                    "line {}: missing label column '{label_col}'",
                    line_num + 1
                ))
            })?;
        rows.push((row.celex_id, row.text, labels.to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use std::fs;

    fn write_jsonl(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("data.jsonl");
        let lines = [
            r#"{"celex_id": "d1", "text": "Alpha Beta", "Labels": "a;b"}"#,
            r#"{"celex_id": "d2", "text": "Gamma", "Labels": "b"}"#,
        ];
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_jsonl_load_lowercases_uncased() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_jsonl(dir.path());
        let cfg = test_config(&data, "exp", dir.path());

        let corpus = load_corpus(&cfg, &SplitLists::empty(), LogLevel::Quiet).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.docs()[0].text, "alpha beta");
        assert_eq!(corpus.docs()[0].labels_raw, "a;b");
        assert_eq!(corpus.docs()[0].split, Split::NoSplit);
    }

    #[test]
    fn test_cased_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_jsonl(dir.path());
        let mut cfg = test_config(&data, "exp", dir.path());
        cfg.cased = true;

        let corpus = load_corpus(&cfg, &SplitLists::empty(), LogLevel::Quiet).unwrap();
        assert_eq!(corpus.docs()[0].text, "Alpha Beta");
    }

    #[test]
    fn test_missing_label_column_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        fs::write(&path, r#"{"celex_id": "d1", "text": "t", "Other": "a"}"#).unwrap();
        let cfg = test_config(&path, "exp", dir.path());

        assert!(load_corpus(&cfg, &SplitLists::empty(), LogLevel::Quiet).is_err());
    }

    #[test]
    fn test_unsupported_extension_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        fs::write(&path, b"").unwrap();
        let cfg = test_config(&path, "exp", dir.path());

        assert!(load_corpus(&cfg, &SplitLists::empty(), LogLevel::Quiet).is_err());
    }
}
