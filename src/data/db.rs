//! Read-only SQLite access to the flow-run history table.
//!
//! The connection lives for exactly one probe or one query and is dropped
//! immediately after, success or failure. All filter values are bound
//! parameters; nothing is ever spliced into the SQL text.

use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, ToSql};

use crate::config::DbConfig;
use crate::domain::RawRun;
use crate::error::DataError;

/// Lightweight connectivity check: open read-only, run a test query.
pub fn probe(config: &DbConfig, timeout: Duration) -> Result<(), DataError> {
    let conn = open_read_only(config, timeout)?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(|e| DataError::Connectivity(format!("test query failed: {e}")))?;
    Ok(())
}

/// Fetch the raw rows for one calendar day.
///
/// `project` is pushed down as a bound parameter when present. The status
/// filter is intentionally not pushed down: raw status strings only collapse
/// into the normalized vocabulary after validation.
pub fn fetch_runs(
    config: &DbConfig,
    date: NaiveDate,
    project: Option<&str>,
    timeout: Duration,
) -> Result<Vec<RawRun>, DataError> {
    let conn = open_read_only(config, timeout)?;

    // Timestamps are stored as ISO-8601 text, which compares
    // lexicographically, so bare date strings work as half-open day bounds
    // for both `T`- and space-separated values.
    let day_start = date.to_string();
    let day_end = date
        .succ_opt()
        .ok_or_else(|| DataError::Load(format!("date out of range: {date}")))?
        .to_string();

    let mut sql = String::from(
        "SELECT flow_name, project, status, start_time, end_time \
         FROM flow_runs \
         WHERE start_time >= :start AND start_time < :end",
    );
    let project_value = project.map(str::to_string);
    let mut params: Vec<(&str, &dyn ToSql)> = vec![(":start", &day_start), (":end", &day_end)];
    if let Some(value) = &project_value {
        sql.push_str(" AND project = :project");
        params.push((":project", value));
    }
    sql.push_str(" ORDER BY start_time");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| DataError::Load(format!("query preparation failed: {e}")))?;

    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok(RawRun {
                flow_name: row.get(0)?,
                project: row.get(1)?,
                status: row.get(2)?,
                start_time: row.get(3)?,
                end_time: row.get(4)?,
            })
        })
        .map_err(|e| DataError::Load(format!("query failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| DataError::Load(format!("row decode failed: {e}")))?);
    }
    Ok(out)
}

fn open_read_only(config: &DbConfig, timeout: Duration) -> Result<Connection, DataError> {
    let conn = Connection::open_with_flags(
        &config.database,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| {
        DataError::Connectivity(format!("cannot open database '{}': {e}", config.database))
    })?;
    conn.busy_timeout(timeout)
        .map_err(|e| DataError::Connectivity(format!("cannot set busy timeout: {e}")))?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "CREATE TABLE flow_runs (\
                            flow_name TEXT,\
                            project TEXT,\
                            status TEXT,\
                            start_time TEXT,\
                            end_time TEXT\
                          )";

    fn seeded_db(dir: &tempfile::TempDir) -> DbConfig {
        let path = dir.path().join("flows.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute(SCHEMA, []).unwrap();
        let rows = [
            ("F1", "AMZ", "Succeeded", "2024-01-01 10:00:00", "2024-01-01 10:05:00"),
            ("F2", "PS", "Failed", "2024-01-01T23:59:59", ""),
            ("F3", "AMZ", "Succeeded", "2024-01-02 00:00:00", "2024-01-02 00:01:00"),
        ];
        for (flow, project, status, start, end) in rows {
            conn.execute(
                "INSERT INTO flow_runs VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![flow, project, status, start, end],
            )
            .unwrap();
        }
        DbConfig {
            server: "local".to_string(),
            database: path.display().to_string(),
            user: "reader".to_string(),
            password: "secret".to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn probe_succeeds_against_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_db(&dir);
        probe(&config, Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn probe_fails_for_missing_file() {
        let config = DbConfig {
            server: "local".to_string(),
            database: "/nonexistent/flows.db".to_string(),
            user: "reader".to_string(),
            password: "secret".to_string(),
        };
        let err = probe(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DataError::Connectivity(_)));
    }

    #[test]
    fn fetch_is_scoped_to_the_day() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_db(&dir);
        let rows = fetch_runs(&config, day(2024, 1, 1), None, Duration::from_secs(1)).unwrap();
        // Both timestamp separators fall inside the day; midnight of the
        // next day does not.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].flow_name.as_deref(), Some("F1"));
        assert_eq!(rows[1].flow_name.as_deref(), Some("F2"));
    }

    #[test]
    fn project_filter_is_bound_not_spliced() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_db(&dir);

        let rows =
            fetch_runs(&config, day(2024, 1, 1), Some("AMZ"), Duration::from_secs(1)).unwrap();
        assert_eq!(rows.len(), 1);

        // A hostile filter value matches nothing instead of everything.
        let rows = fetch_runs(
            &config,
            day(2024, 1, 1),
            Some("x' OR '1'='1"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_day_returns_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_db(&dir);
        let rows = fetch_runs(&config, day(2024, 2, 1), None, Duration::from_secs(1)).unwrap();
        assert!(rows.is_empty());
    }
}
