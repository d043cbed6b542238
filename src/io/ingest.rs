//! CSV ingest.
//!
//! This module is responsible for turning a `flow_data_*.csv` export into
//! raw run rows for the validator.
//!
//! Design goals:
//! - **Tolerant headers**: case-insensitive, BOM-stripped, legacy export
//!   column names accepted as aliases
//! - **Row-level resilience**: a malformed line is counted, not fatal
//! - **Separation of concerns**: no validation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::RawRun;
use crate::error::DataError;

/// Column aliases, canonical name first. The legacy names are what the flow
/// platform's own exports carry.
const FLOW_NAME_COLS: [&str; 2] = ["flow_name", "flowname"];
const PROJECT_COLS: [&str; 2] = ["project", "automation_project"];
const STATUS_COLS: [&str; 2] = ["status", "taskstatus"];
const START_COLS: [&str; 2] = ["start_time", "datetimestarted"];
const END_COLS: [&str; 2] = ["end_time", "datetimecompleted"];

/// Raw rows read from one CSV file.
#[derive(Debug, Clone, Default)]
pub struct RawCsv {
    pub rows: Vec<RawRun>,
    /// Lines the CSV parser itself rejected (counted as skipped downstream).
    pub malformed: usize,
}

/// Read every data row of `path` into `RawRun`s.
///
/// Only the columns the validator hard-requires (`flow_name`, `status`,
/// `start_time`) must be present in the header; a missing `project` or
/// `end_time` column is tolerated and logged.
pub fn read_runs(path: &Path) -> Result<RawCsv, DataError> {
    let file = File::open(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns(&header_map, path)?;

    for (canonical, aliases) in [("project", &PROJECT_COLS), ("end_time", &END_COLS)] {
        if resolve_column(&header_map, aliases).is_none() {
            tracing::warn!(file = %path.display(), column = canonical, "optional column missing");
        }
    }

    let mut out = RawCsv::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %e, "malformed CSV line");
                out.malformed += 1;
                continue;
            }
        };
        out.rows.push(RawRun {
            flow_name: get_aliased(&record, &header_map, &FLOW_NAME_COLS),
            project: get_aliased(&record, &header_map, &PROJECT_COLS),
            status: get_aliased(&record, &header_map, &STATUS_COLS),
            start_time: get_aliased(&record, &header_map, &START_COLS),
            end_time: get_aliased(&record, &header_map, &END_COLS),
        });
    }

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation will
    // incorrectly report a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns(
    header_map: &HashMap<String, usize>,
    path: &Path,
) -> Result<(), DataError> {
    for (canonical, aliases) in [
        ("flow_name", &FLOW_NAME_COLS),
        ("status", &STATUS_COLS),
        ("start_time", &START_COLS),
    ] {
        if resolve_column(header_map, aliases).is_none() {
            return Err(DataError::Load(format!(
                "CSV '{}' is missing required column `{canonical}`",
                path.display()
            )));
        }
    }
    Ok(())
}

fn resolve_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|name| header_map.get(*name).copied())
}

fn get_aliased(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    aliases: &[&str],
) -> Option<String> {
    let idx = resolve_column(header_map, aliases)?;
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
