use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{MingleError, MingleResult};
use crate::model::record::{BoundingBox, InteractionRecord, ManitoRecord};

// ---------------------------------------------------------------------------
// Dataset: one loaded, sorted snapshot of the tagged-photo table
// ---------------------------------------------------------------------------

/// An immutable snapshot of the tagged-photo CSV.
///
/// Loaded once with an explicit path, sorted by timestamp, and then only read.
/// Re-reading the file produces a fresh snapshot; nothing is ever mutated in
/// place, which is what lets the server share one snapshot across requests.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    records: Vec<InteractionRecord>,
}

/// Raw CSV row. Timestamps arrive as strings because the exports use
/// bare `YYYY-MM-DD HH:MM:SS` at least as often as RFC 3339.
#[derive(Debug, Deserialize)]
struct RawRow {
    class: String,
    filename: String,
    timestamp: String,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    #[serde(default)]
    description: Option<String>,
}

impl Dataset {
    /// Load and sort the tagged-photo table at `path`.
    ///
    /// Fails with a distinct error for a missing file, an empty table, or a
    /// row whose timestamp cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> MingleResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MingleError::MissingInputFile(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();

        for (index, row) in reader.deserialize::<RawRow>().enumerate() {
            // Header is line 1, first data row line 2.
            let line = index as u64 + 2;
            let row = row.map_err(|err| MingleError::MalformedRecord {
                line,
                reason: err.to_string(),
            })?;

            let timestamp = parse_timestamp(&row.timestamp)?;
            records.push(InteractionRecord {
                person: row.class,
                filename: row.filename,
                timestamp,
                bbox: BoundingBox::new(row.xmin, row.ymin, row.xmax, row.ymax),
                description: row.description,
            });
        }

        if records.is_empty() {
            return Err(MingleError::EmptyDataset(path.to_path_buf()));
        }

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "loaded tagged-photo dataset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Load the manito table (`from,to,description`) at `path`, in file order.
    pub fn load_manito(path: impl AsRef<Path>) -> MingleResult<Vec<ManitoRecord>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MingleError::MissingInputFile(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<ManitoRecord>().enumerate() {
            let line = index as u64 + 2;
            records.push(row.map_err(|err| MingleError::MalformedRecord {
                line,
                reason: err.to_string(),
            })?);
        }

        if records.is_empty() {
            return Err(MingleError::EmptyDataset(path.to_path_buf()));
        }

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "loaded manito dataset"
        );
        Ok(records)
    }

    /// The file this snapshot was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, ascending by timestamp.
    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct people, in identifier order.
    pub fn people(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.person.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    /// Distinct photos.
    pub fn photo_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.filename.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct timestamps, ascending.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut stamps: Vec<DateTime<Utc>> = self.records.iter().map(|r| r.timestamp).collect();
        stamps.dedup();
        stamps
    }

    /// Earliest and latest timestamp in the data.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.records.first()?.timestamp;
        let last = self.records.last()?.timestamp;
        Some((first, last))
    }

    /// Whether a person appears anywhere in the data.
    pub fn knows_person(&self, person: &str) -> bool {
        self.records.iter().any(|r| r.person == person)
    }
}

/// Parse a timestamp as RFC 3339, falling back to the common bare formats
/// the tagging exports use. Naive timestamps are taken as UTC.
pub fn parse_timestamp(value: &str) -> MingleResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }

    Err(MingleError::InvalidTimestamp {
        value: value.to_string(),
        reason: "expected RFC 3339 or YYYY-MM-DD HH:MM[:SS]".to_string(),
    })
}
