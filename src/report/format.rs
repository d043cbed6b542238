//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the loading/aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{AggregateView, Dataset, GroupBy, LoadStatus};
use crate::error::DataError;

/// Format the load summary header (source, counts, skip notice).
pub fn format_summary(dataset: &Dataset, status: LoadStatus) -> String {
    let mut out = String::new();

    out.push_str("=== flowmon - Cloud Flow Run Monitor ===\n");
    out.push_str(&format!(
        "Source: {} ({})\n",
        dataset.source.display_name(),
        dataset.source_identifier
    ));
    out.push_str(&format!(
        "Loaded: {} | rows: {} raw, {} valid\n",
        dataset.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        dataset.row_count_raw,
        dataset.row_count_valid
    ));

    match status {
        LoadStatus::EmptyResult => {
            out.push_str("No data for the selected date.\n");
        }
        LoadStatus::PartialSuccess => {
            out.push_str(&format!(
                "{} row(s) skipped during validation.\n",
                dataset.rows_skipped()
            ));
        }
        LoadStatus::Success | LoadStatus::Failure => {}
    }

    out
}

/// Format one aggregate view as a fixed-width table.
pub fn format_aggregate(view: &AggregateView) -> String {
    let mut out = String::new();

    let dimension = match view.group_by {
        GroupBy::Project => "project",
        GroupBy::Status => "status",
        GroupBy::Date => "date",
        GroupBy::Hour => "hour",
    };
    out.push_str(&format!("\nRuns by {dimension}:\n"));

    if view.groups.is_empty() {
        out.push_str("  (no records)\n");
        return out;
    }

    let key_width = view
        .groups
        .iter()
        .map(|g| g.key.len())
        .max()
        .unwrap_or(0)
        .max(dimension.len());

    out.push_str(&format!(
        "  {:<key_width$}  {:>5}  {:>9}  {:>6}  {:>7}  {:>9}  {:>5}  {:>8}\n",
        dimension, "total", "succeeded", "failed", "running", "cancelled", "other", "success"
    ));
    for group in &view.groups {
        let rate = group
            .success_rate
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "  {:<key_width$}  {:>5}  {:>9}  {:>6}  {:>7}  {:>9}  {:>5}  {:>8}\n",
            group.key,
            group.total,
            group.succeeded,
            group.failed,
            group.running,
            group.cancelled,
            group.other,
            rate
        ));
    }

    out
}

/// Format a failed refresh cycle for the terminal.
///
/// The watch loop keeps running after this; a load failure is a state to
/// display, not a reason to exit.
pub fn format_cycle_failure(err: &DataError) -> String {
    match err {
        DataError::NoDataSourceAvailable => {
            "No data available: no reachable database and no flow_data_*.csv file found.\n"
                .to_string()
        }
        other => format!("Load failed: {other}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FlowRunRecord, RunStatus, SourceKind};
    use crate::report::aggregate;
    use chrono::{NaiveDate, Utc};

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Dataset {
            records: vec![FlowRunRecord {
                flow_name: "AMZ - Order Processing".to_string(),
                project: "AMZ".to_string(),
                status: RunStatus::Succeeded,
                start_time: start,
                end_time: None,
                duration_seconds: None,
            }],
            source: SourceKind::Csv,
            source_identifier: "flow_data_2024-01-01.csv".to_string(),
            loaded_at: Utc::now(),
            row_count_raw: 3,
            row_count_valid: 1,
        }
    }

    #[test]
    fn partial_load_mentions_skipped_rows() {
        let out = format_summary(&dataset(), LoadStatus::PartialSuccess);
        assert!(out.contains("2 row(s) skipped"), "got: {out}");
        assert!(out.contains("CSV"));
    }

    #[test]
    fn empty_result_is_a_notice_not_an_error() {
        let out = format_summary(&dataset(), LoadStatus::EmptyResult);
        assert!(out.contains("No data for the selected date"));
    }

    #[test]
    fn aggregate_table_shows_rate_and_na() {
        let data = dataset();
        let view = aggregate(&data, GroupBy::Project);
        let out = format_aggregate(&view);
        assert!(out.contains("AMZ"));
        assert!(out.contains("100.0%"), "got: {out}");

        let mut running_only = data.clone();
        running_only.records[0].status = RunStatus::Running;
        let view = aggregate(&running_only, GroupBy::Project);
        assert!(format_aggregate(&view).contains("n/a"));
    }

    #[test]
    fn no_data_source_failure_reads_as_no_data() {
        let out = format_cycle_failure(&DataError::NoDataSourceAvailable);
        assert!(out.contains("No data available"));
    }
}
