//! Row validation and coercion.
//!
//! This module turns a `RawRun` from either source into a canonical
//! `FlowRunRecord`, or rejects it with a `ValidationError`.
//!
//! Failure severity:
//! - **hard** (row excluded, counted): missing `flow_name`/`status`/
//!   `start_time`, unparseable start timestamp
//! - **soft** (row kept, value normalized): unknown status (`Other`),
//!   missing/unparseable end timestamp, end before start, empty project

use chrono::NaiveDateTime;

use crate::domain::{FlowRunRecord, RawRun, RunStatus};
use crate::error::ValidationError;

/// Accepted timestamp formats, tried in order; first successful parse wins.
///
/// `%.f` also matches an absent fraction, so the ISO variants cover both
/// `2024-01-01T10:00:00` and `2024-01-01T10:00:00.123`.
const TIMESTAMP_FMTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a timestamp against the known format list.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in TIMESTAMP_FMTS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    None
}

/// Validate and coerce one raw row into a canonical record.
pub fn validate(raw: &RawRun) -> Result<FlowRunRecord, ValidationError> {
    let flow_name = require(&raw.flow_name, "flow_name")?;
    let status_raw = require(&raw.status, "status")?;
    let start_raw = require(&raw.start_time, "start_time")?;

    let start_time = parse_timestamp(start_raw)
        .ok_or_else(|| ValidationError::BadTimestamp(start_raw.to_string()))?;

    let status = RunStatus::from_raw(status_raw);

    // End time is best-effort: an unparseable value or one before the start
    // is treated as absent, keeping the end >= start invariant.
    let end_time = raw
        .end_time
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_timestamp)
        .filter(|end| *end >= start_time);

    let duration_seconds = end_time.map(|end| (end - start_time).num_seconds());

    let project = raw
        .project
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derive_project(flow_name));

    Ok(FlowRunRecord {
        flow_name: flow_name.to_string(),
        project,
        status,
        start_time,
        end_time,
        duration_seconds,
    })
}

fn require<'a>(
    field: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, ValidationError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(name))
}

/// Derive a project name from a flow name when no project column is present.
///
/// Flow names in the wild follow `"AMZ - Order Processing"` or
/// `"PS_Report_Generation"`; the prefix before the first separator is the
/// project.
fn derive_project(flow_name: &str) -> String {
    if let Some((prefix, _)) = flow_name.split_once(" - ") {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            return prefix.to_string();
        }
    }
    if let Some((prefix, _)) = flow_name.split_once('_') {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            return prefix.to_string();
        }
    }
    "Unknown".to_string()
}
