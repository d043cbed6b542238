//! Data loading with one-shot DB-to-CSV fallback.
//!
//! `load` executes a single source read, applies the validator to every raw
//! row, and classifies the outcome; `load_with_fallback` wraps it with the
//! selection step and the one retry the fallback policy allows (DB to CSV
//! only, never the other way around).

use chrono::{NaiveDate, Utc};

use crate::config::AppConfig;
use crate::data::db;
use crate::data::select::{self, SourceDescriptor};
use crate::domain::{Dataset, FlowRunRecord, LoadStatus, RawRun, RunFilter, SourceKind};
use crate::error::DataError;
use crate::io::ingest;
use crate::validate;

/// Select a source, load it, and retry once via CSV when a database load
/// fails mid-flight.
pub fn load_with_fallback(
    config: &AppConfig,
    filter_date: NaiveDate,
    filter: &RunFilter,
) -> Result<(Dataset, LoadStatus), DataError> {
    let descriptor = select::select_source(config, filter_date)?;
    match load(&descriptor, filter_date, filter, config) {
        Ok(out) => Ok(out),
        Err(e) if descriptor.kind() == SourceKind::Db => {
            tracing::warn!(error = %e, "database load failed, retrying with CSV fallback");
            let fallback = select::discover_csv(config, filter_date)?;
            load(&fallback, filter_date, filter, config)
        }
        Err(e) => Err(e),
    }
}

/// Load one source for one calendar day.
///
/// Counting rules:
/// - `row_count_valid` — validated records on the filter date
/// - `row_count_raw` — the above plus rows the validator rejected
///
/// A CSV row for a different date matches neither count; it simply does not
/// belong to this load. The optional `filter` narrows the returned records
/// only, never the counts.
pub fn load(
    descriptor: &SourceDescriptor,
    filter_date: NaiveDate,
    filter: &RunFilter,
    config: &AppConfig,
) -> Result<(Dataset, LoadStatus), DataError> {
    let (raw_rows, malformed) = match descriptor {
        SourceDescriptor::Db(db_config) => {
            let rows = db::fetch_runs(
                db_config,
                filter_date,
                filter.project.as_deref(),
                config.busy_timeout,
            )?;
            (rows, 0)
        }
        SourceDescriptor::Csv(path) => {
            let raw = ingest::read_runs(path)?;
            (raw.rows, raw.malformed)
        }
    };

    let (mut records, skipped) = validate_rows(&raw_rows, filter_date);
    records.sort_by_key(|r| r.start_time);

    let row_count_valid = records.len();
    let row_count_raw = row_count_valid + skipped + malformed;
    let status = LoadStatus::from_counts(row_count_raw, row_count_valid);

    tracing::info!(
        source = descriptor.kind().display_name(),
        identifier = %descriptor.identifier(),
        date = %filter_date,
        rows_raw = row_count_raw,
        rows_valid = row_count_valid,
        "load complete"
    );

    let dataset = Dataset {
        records,
        source: descriptor.kind(),
        source_identifier: descriptor.identifier(),
        loaded_at: Utc::now(),
        row_count_raw,
        row_count_valid,
    };
    let dataset = if filter.is_empty() {
        dataset
    } else {
        dataset.filtered(filter)
    };
    Ok((dataset, status))
}

/// Validate every raw row and keep the ones on the filter date.
///
/// Returns the kept records plus the number of rows the validator rejected.
fn validate_rows(rows: &[RawRun], filter_date: NaiveDate) -> (Vec<FlowRunRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for raw in rows {
        match validate::validate(raw) {
            Ok(record) => {
                if record.start_time.date() == filter_date {
                    records.push(record);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "row rejected");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::domain::RunStatus;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config(dirs: Vec<std::path::PathBuf>, db: Option<DbConfig>) -> AppConfig {
        AppConfig {
            db,
            search_dirs: dirs,
            busy_timeout: Duration::from_millis(200),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const HEADER: &str = "flow_name,project,status,start_time,end_time\n";

    #[test]
    fn clean_csv_load_is_a_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!(
                "{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,2024-01-01T10:05:00\n\
                 F2,PS,Failed,2024-01-01T09:00:00,2024-01-01T09:01:00\n"
            ),
        );

        let (dataset, status) = load(
            &SourceDescriptor::Csv(path),
            day(2024, 1, 1),
            &RunFilter::default(),
            &config(vec![], None),
        )
        .unwrap();

        assert_eq!(status, LoadStatus::Success);
        assert_eq!(dataset.row_count_raw, 2);
        assert_eq!(dataset.row_count_valid, 2);
        // Ordered by start time.
        assert_eq!(dataset.records[0].flow_name, "F2");
        assert_eq!(dataset.source, SourceKind::Csv);
    }

    #[test]
    fn invalid_rows_yield_partial_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!(
                "{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,\n\
                 ,AMZ,Succeeded,2024-01-01T10:00:00,\n\
                 F3,AMZ,Succeeded,garbage,\n"
            ),
        );

        let (dataset, status) = load(
            &SourceDescriptor::Csv(path),
            day(2024, 1, 1),
            &RunFilter::default(),
            &config(vec![], None),
        )
        .unwrap();

        assert_eq!(status, LoadStatus::PartialSuccess);
        assert_eq!(dataset.row_count_raw, 3);
        assert_eq!(dataset.row_count_valid, 1);
        assert_eq!(dataset.rows_skipped(), 2);
    }

    #[test]
    fn no_rows_for_the_date_is_an_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!("{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,\n"),
        );

        let (dataset, status) = load(
            &SourceDescriptor::Csv(path),
            day(2024, 3, 1),
            &RunFilter::default(),
            &config(vec![], None),
        )
        .unwrap();

        assert_eq!(status, LoadStatus::EmptyResult);
        assert_eq!(dataset.row_count_raw, 0);
        assert!(dataset.records.is_empty());
    }

    #[test]
    fn filters_narrow_records_but_not_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!(
                "{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,\n\
                 F2,PS,Failed,2024-01-01T11:00:00,\n"
            ),
        );

        let (dataset, status) = load(
            &SourceDescriptor::Csv(path),
            day(2024, 1, 1),
            &RunFilter {
                project: None,
                status: Some(RunStatus::Failed),
            },
            &config(vec![], None),
        )
        .unwrap();

        assert_eq!(status, LoadStatus::Success);
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].flow_name, "F2");
        assert_eq!(dataset.row_count_valid, 2);
    }

    #[test]
    fn db_failure_falls_back_to_csv_once() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!("{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,\n"),
        );
        // Credentials are complete but the database file does not exist, so
        // the probe fails and selection already lands on CSV.
        let config = config(
            vec![dir.path().to_path_buf()],
            Some(DbConfig {
                server: "sql01".to_string(),
                database: dir.path().join("missing.db").display().to_string(),
                user: "reader".to_string(),
                password: "secret".to_string(),
            }),
        );

        let (dataset, status) =
            load_with_fallback(&config, day(2024, 1, 1), &RunFilter::default()).unwrap();
        assert_eq!(dataset.source, SourceKind::Csv);
        assert_eq!(status, LoadStatus::Success);
    }

    #[test]
    fn db_load_failure_after_successful_probe_retries_with_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "flow_data_2024-01-01.csv",
            &format!("{HEADER}F1,AMZ,Succeeded,2024-01-01T10:00:00,\n"),
        );
        // A real SQLite file without the expected table: the probe's
        // `SELECT 1` succeeds, the day query then fails, exercising the
        // loader-level retry rather than the selector-level fallback.
        let db_path = dir.path().join("flows.db");
        rusqlite::Connection::open(&db_path).unwrap();
        let config = config(
            vec![dir.path().to_path_buf()],
            Some(DbConfig {
                server: "sql01".to_string(),
                database: db_path.display().to_string(),
                user: "reader".to_string(),
                password: "secret".to_string(),
            }),
        );

        let (dataset, status) =
            load_with_fallback(&config, day(2024, 1, 1), &RunFilter::default()).unwrap();
        assert_eq!(dataset.source, SourceKind::Csv);
        assert_eq!(status, LoadStatus::Success);
    }

    #[test]
    fn csv_failure_does_not_retry() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("flow_data_2024-01-01.csv");

        let err = load(
            &SourceDescriptor::Csv(missing),
            day(2024, 1, 1),
            &RunFilter::default(),
            &config(vec![], None),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn nothing_available_surfaces_no_data_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(vec![dir.path().to_path_buf()], None);
        let err = load_with_fallback(&config, day(2024, 1, 1), &RunFilter::default()).unwrap_err();
        assert!(matches!(err, DataError::NoDataSourceAvailable));
    }
}
