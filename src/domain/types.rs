//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the loader and the presentation layer
//! - exported to JSON for downstream tooling
//! - compared structurally in tests

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Normalized status of one flow run.
///
/// Raw status strings are matched case-insensitively; anything outside the
/// known vocabulary maps to `Other` (tolerant of upstream vocabulary drift)
/// rather than failing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Succeeded,
    Failed,
    Running,
    Cancelled,
    Other,
}

impl RunStatus {
    pub const ALL: [RunStatus; 5] = [
        RunStatus::Succeeded,
        RunStatus::Failed,
        RunStatus::Running,
        RunStatus::Cancelled,
        RunStatus::Other,
    ];

    /// Normalize a raw status string.
    ///
    /// The synonym sets come from the vocabulary the upstream flow platform
    /// actually emits (`Completed`, `Error`, `TimedOut`, one-l `Canceled`, ...).
    pub fn from_raw(raw: &str) -> RunStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "succeeded" | "completed" => RunStatus::Succeeded,
            "failed" | "error" | "timedout" => RunStatus::Failed,
            "running" | "inprogress" | "started" => RunStatus::Running,
            "cancelled" | "canceled" => RunStatus::Cancelled,
            _ => RunStatus::Other,
        }
    }

    /// Human-readable label for terminal output and group keys.
    pub fn display_name(self) -> &'static str {
        match self {
            RunStatus::Succeeded => "Succeeded",
            RunStatus::Failed => "Failed",
            RunStatus::Running => "Running",
            RunStatus::Cancelled => "Cancelled",
            RunStatus::Other => "Other",
        }
    }
}

/// An unvalidated row as produced by either source.
///
/// Both the database reader and the CSV reader emit this shape so that a
/// single validator serves both paths. Every field is optional here; the
/// validator decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRun {
    pub flow_name: Option<String>,
    pub project: Option<String>,
    pub status: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// One validated execution event of a cloud flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRunRecord {
    pub flow_name: String,
    /// Never empty; falls back to a prefix derived from the flow name, then
    /// to `"Unknown"`.
    pub project: String,
    pub status: RunStatus,
    pub start_time: NaiveDateTime,
    /// Absent while the run is still in flight. When present, always
    /// `>= start_time`.
    pub end_time: Option<NaiveDateTime>,
    /// `end_time - start_time`, only when both are present.
    pub duration_seconds: Option<i64>,
}

/// Which source a dataset was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Db,
    Csv,
}

impl SourceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::Db => "database",
            SourceKind::Csv => "CSV",
        }
    }
}

/// Outcome classification of one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Every considered row validated.
    Success,
    /// At least one row was skipped by the validator.
    PartialSuccess,
    /// Zero rows matched the requested date. Not an error.
    EmptyResult,
    /// Source unreachable or unreadable. Produced by the refresh cycle when
    /// a load errors terminally, never by `from_counts`.
    Failure,
}

impl LoadStatus {
    /// Classify a completed load from its row counts.
    pub fn from_counts(raw: usize, valid: usize) -> LoadStatus {
        if raw == 0 {
            LoadStatus::EmptyResult
        } else if valid < raw {
            LoadStatus::PartialSuccess
        } else {
            LoadStatus::Success
        }
    }
}

/// Optional narrowing applied to loaded records.
///
/// The project filter is pushed down to the database query where possible;
/// the status filter always applies in-process because the raw status
/// vocabulary (synonyms, casing) only collapses after validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFilter {
    pub project: Option<String>,
    pub status: Option<RunStatus>,
}

impl RunFilter {
    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.status.is_none()
    }

    pub fn matches(&self, record: &FlowRunRecord) -> bool {
        if let Some(project) = &self.project {
            if !record.project.eq_ignore_ascii_case(project) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

/// An ordered sequence of validated records plus provenance metadata.
///
/// Constructed fresh on every load request and never mutated in place;
/// `filtered` produces a new derived dataset. The row counts always describe
/// the load itself, not any later narrowing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Records ordered by start time.
    pub records: Vec<FlowRunRecord>,
    pub source: SourceKind,
    /// Database path or CSV file path.
    pub source_identifier: String,
    pub loaded_at: DateTime<Utc>,
    /// Rows considered for the requested date, including skipped ones.
    pub row_count_raw: usize,
    /// Rows that survived validation.
    pub row_count_valid: usize,
}

impl Dataset {
    /// Rows rejected by the validator during this load.
    pub fn rows_skipped(&self) -> usize {
        self.row_count_raw - self.row_count_valid
    }

    /// Derived dataset with records narrowed by `filter`.
    ///
    /// Provenance and load counts carry over unchanged.
    pub fn filtered(&self, filter: &RunFilter) -> Dataset {
        let records = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Dataset {
            records,
            ..self.clone()
        }
    }
}

/// Grouping dimension for aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Project,
    Status,
    /// Calendar day of the start time.
    Date,
    /// Hour-of-day bucket (00-23) of the start time.
    Hour,
}

impl GroupBy {
    /// The group key a record falls into under this dimension.
    pub fn key_for(self, record: &FlowRunRecord) -> String {
        match self {
            GroupBy::Project => record.project.clone(),
            GroupBy::Status => record.status.display_name().to_string(),
            GroupBy::Date => record.start_time.date().to_string(),
            GroupBy::Hour => format!("{:02}:00", record.start_time.hour()),
        }
    }
}

/// Per-group counts and success rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub running: usize,
    pub cancelled: usize,
    pub other: usize,
    /// `succeeded / (succeeded + failed)`; `None` when the denominator is
    /// zero (never `0.0`, which would misread as "all failing").
    pub success_rate: Option<f64>,
}

/// Read-only grouped summary of a dataset.
///
/// Groups are sorted by descending total count, ties broken by key
/// ascending, so output is stable across repeated runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub group_by: GroupBy,
    pub groups: Vec<GroupSummary>,
}
