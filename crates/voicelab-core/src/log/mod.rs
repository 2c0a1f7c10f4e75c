//! Append-only result log in two parallel forms: a flattened CSV row and a
//! full JSONL record per trial. Both are flushed after every append, so an
//! interruption loses at most the in-flight trial. The CSV's tuple set is
//! the source of truth for resumability.

use crate::model::{TrialKey, TrialRecord};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub struct ResultLog {
    csv: csv::Writer<std::fs::File>,
    jsonl: std::fs::File,
}

impl ResultLog {
    /// Open both log files in append mode. The CSV header is written only
    /// when the file is new/empty, so resumed runs keep a single header.
    pub fn open(csv_path: &Path, jsonl_path: &Path) -> anyhow::Result<Self> {
        let resume = csv_path.exists()
            && std::fs::metadata(csv_path)
                .map(|m| m.len() > 0)
                .unwrap_or(false);

        let csv_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(csv_path)
            .with_context(|| format!("failed to open {}", csv_path.display()))?;
        let csv = csv::WriterBuilder::new()
            .has_headers(!resume)
            .from_writer(csv_file);

        let jsonl = OpenOptions::new()
            .create(true)
            .append(true)
            .open(jsonl_path)
            .with_context(|| format!("failed to open {}", jsonl_path.display()))?;

        Ok(Self { csv, jsonl })
    }

    /// Append one trial to both forms, same order, flushing immediately.
    pub fn append(&mut self, record: &TrialRecord) -> anyhow::Result<()> {
        self.csv.serialize(&record.row)?;
        self.csv.flush()?;

        serde_json::to_writer(&mut self.jsonl, record)?;
        self.jsonl.write_all(b"\n")?;
        self.jsonl.flush()?;
        Ok(())
    }
}

/// Only the identity columns matter for resumability; everything else in
/// the row is ignored on load.
#[derive(Debug, Deserialize)]
struct CompletedRow {
    persona_key: String,
    prompt_id: usize,
    overlay: String,
    use_overlay: bool,
}

/// Load the set of completed trial tuples from the tabular log. Any read
/// or parse failure yields the empty set with a warning: re-running a
/// trial is safe, crashing the resume is not.
pub fn load_completed(csv_path: &Path) -> HashSet<TrialKey> {
    match read_completed(csv_path) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(
                path = %csv_path.display(),
                error = %e,
                "could not load existing results; starting fresh"
            );
            HashSet::new()
        }
    }
}

fn read_completed(path: &Path) -> anyhow::Result<HashSet<TrialKey>> {
    let mut completed = HashSet::new();
    if !path.exists() {
        return Ok(completed);
    }
    let mut reader = csv::Reader::from_path(path)?;
    for row in reader.deserialize::<CompletedRow>() {
        let row = row?;
        completed.insert(TrialKey {
            persona_key: row.persona_key,
            prompt_id: row.prompt_id,
            overlay: row.overlay,
            use_overlay: row.use_overlay,
        });
    }
    Ok(completed)
}
