//! CSV fallback discovery.
//!
//! Scans the configured directories for `flow_data_*.csv`, dates each
//! candidate from its filename (falling back to filesystem modification
//! time), and picks the most recent. Identical dates tie-break by
//! lexicographic filename, greatest first, so selection is deterministic
//! regardless of directory iteration order.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

pub const FILE_PREFIX: &str = "flow_data_";
pub const FILE_EXTENSION: &str = "csv";

/// One discovered fallback file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvCandidate {
    pub path: PathBuf,
    pub file_name: String,
    /// Date embedded in the filename, or the modification date when the
    /// filename carries none.
    pub dated: NaiveDate,
}

/// Find the most recent `flow_data_*.csv` under `search_dirs`.
///
/// Unreadable directories are skipped, not fatal; a missing `data/`
/// subdirectory is the common case.
pub fn discover(search_dirs: &[PathBuf]) -> Option<CsvCandidate> {
    let mut candidates = Vec::new();
    for dir in search_dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable search dir");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(candidate) = classify(&path) {
                candidates.push(candidate);
            }
        }
    }
    candidates
        .into_iter()
        .max_by(|a, b| (a.dated, &a.file_name).cmp(&(b.dated, &b.file_name)))
}

fn classify(path: &Path) -> Option<CsvCandidate> {
    if !path.is_file() {
        return None;
    }
    let file_name = path.file_name()?.to_str()?.to_string();
    let stem = file_name
        .strip_suffix(&format!(".{FILE_EXTENSION}"))?
        .strip_prefix(FILE_PREFIX)?;

    let dated = embedded_date(stem).or_else(|| modified_date(path))?;
    Some(CsvCandidate {
        path: path.to_path_buf(),
        file_name,
        dated,
    })
}

/// Parse a leading `YYYY-MM-DD` out of the part after the prefix.
fn embedded_date(stem: &str) -> Option<NaiveDate> {
    let head = stem.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn modified_date(path: &Path) -> Option<NaiveDate> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).date_naive())
}
