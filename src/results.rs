//! Results ledger
//!
//! One row of aggregate metrics per cycle, appended to the experiment's
//! `results.csv`. The file is opened in append mode and never truncated or
//! rewritten; a single writer per experiment is assumed.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Number of values in one ledger row: F1, precision@1..19, nDCG@1..19.
pub const ROW_WIDTH: usize = 1 + 19 + 19;

/// Append-only metrics log for one experiment.
pub struct ResultsLedger {
    path: PathBuf,
}

impl ResultsLedger {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one comma-joined row.
    ///
    /// # Errors
    /// `Error::Config` if the row width is wrong (a programming error
    /// surfaced loudly rather than corrupting the ledger), `Error::Io` on
    /// filesystem failures.
    pub fn append(&self, row: &[f64]) -> Result<()> {
        if row.len() != ROW_WIDTH {
            return Err(Error::Config(format!(
                "ledger row must have {ROW_WIDTH} values, got {}",
                row.len()
            )));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("cannot create {}: {e}", parent.display())))?;
        }

        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Io(format!("cannot open {}: {e}", self.path.display())))?;
        writeln!(file, "{line}")
            .map_err(|e| Error::Io(format!("cannot append to {}: {e}", self.path.display())))?;
        Ok(())
    }
}
