//! Demonstration data generation.
//!
//! Writes a seeded, reproducible `flow_data_<date>.csv` so the dashboard can
//! be exercised without a database or a real export. This is strictly
//! opt-in via the `sample` subcommand; the source selector never reaches
//! for generated data on its own.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::discovery::FILE_PREFIX;
use crate::domain::RunStatus;
use crate::error::DataError;

/// Flow names with the project-prefix shape the validator expects.
const FLOWS: [&str; 5] = [
    "AMZ - Order Processing",
    "C2D - Data Integration",
    "PS - Report Generation",
    "WF - System Check",
    "BI - Data Analytics",
];

/// Status mix, roughly a healthy fleet: 70% success, 15% failure.
const STATUS_WEIGHTS: [(RunStatus, f64); 4] = [
    (RunStatus::Succeeded, 0.70),
    (RunStatus::Failed, 0.15),
    (RunStatus::Running, 0.10),
    (RunStatus::Cancelled, 0.05),
];

/// Write a demonstration CSV for `date` into `dir` and return its path.
///
/// The same seed always produces byte-identical output.
pub fn write_sample_csv(dir: &Path, date: NaiveDate, seed: u64) -> Result<PathBuf, DataError> {
    let path = dir.join(format!("{FILE_PREFIX}{date}.csv"));
    let mut writer = csv::Writer::from_path(&path).map_err(|e| DataError::Load(format!(
        "cannot create sample CSV '{}': {e}",
        path.display()
    )))?;

    writer
        .write_record(["flow_name", "project", "status", "start_time", "end_time"])
        .map_err(|e| DataError::Load(format!("sample CSV header write failed: {e}")))?;

    let mut rng = StdRng::seed_from_u64(seed);
    for (flow_idx, flow) in FLOWS.iter().enumerate() {
        for hour in 0u32..24 {
            // Half the flows run every hour, half every other hour.
            if hour % 2 != 0 && flow_idx % 2 != 0 {
                continue;
            }
            let start_minute = rng.gen_range(0..50);
            let start = start_of(date, hour, start_minute);
            let status = pick_status(&mut rng);

            // Runs still in flight have no end time yet.
            let end = match status {
                RunStatus::Running => None,
                _ => {
                    let duration_minutes = rng.gen_range(1..15);
                    Some(start + chrono::Duration::minutes(duration_minutes))
                }
            };

            let project = flow.split(" - ").next().unwrap_or("Unknown");
            let start_cell = format_timestamp(start);
            let end_cell = end.map(format_timestamp).unwrap_or_default();
            writer
                .write_record([
                    *flow,
                    project,
                    status.display_name(),
                    start_cell.as_str(),
                    end_cell.as_str(),
                ])
                .map_err(|e| DataError::Load(format!("sample CSV row write failed: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| DataError::Load(format!("sample CSV flush failed: {e}")))?;
    tracing::info!(file = %path.display(), "sample data written");
    Ok(path)
}

fn start_of(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    // Hour and minute are generated within range, so the fallback is unreachable.
    date.and_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn pick_status(rng: &mut StdRng) -> RunStatus {
    let roll: f64 = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (status, weight) in STATUS_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return status;
        }
    }
    RunStatus::Succeeded
}

fn format_timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}
