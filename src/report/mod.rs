//! Aggregate views over a loaded dataset.
//!
//! `aggregate` is a pure function: no I/O, no mutation of the input, and a
//! deterministic group order so repeated calls on the same dataset render
//! identically.

use std::collections::BTreeMap;

use crate::domain::{AggregateView, Dataset, GroupBy, GroupSummary, RunStatus};

pub mod format;

/// Group the dataset's records by `group_by` and compute per-group status
/// counts plus a success rate.
pub fn aggregate(dataset: &Dataset, group_by: GroupBy) -> AggregateView {
    // BTreeMap gives key-ascending base order; the stable sort by count
    // below then leaves ties in exactly that order.
    let mut counts: BTreeMap<String, Counts> = BTreeMap::new();
    for record in &dataset.records {
        counts
            .entry(group_by.key_for(record))
            .or_default()
            .add(record.status);
    }

    let mut groups: Vec<GroupSummary> = counts
        .into_iter()
        .map(|(key, counts)| counts.into_summary(key))
        .collect();
    groups.sort_by(|a, b| b.total.cmp(&a.total));

    AggregateView { group_by, groups }
}

#[derive(Debug, Default)]
struct Counts {
    succeeded: usize,
    failed: usize,
    running: usize,
    cancelled: usize,
    other: usize,
}

impl Counts {
    fn add(&mut self, status: RunStatus) {
        match status {
            RunStatus::Succeeded => self.succeeded += 1,
            RunStatus::Failed => self.failed += 1,
            RunStatus::Running => self.running += 1,
            RunStatus::Cancelled => self.cancelled += 1,
            RunStatus::Other => self.other += 1,
        }
    }

    fn into_summary(self, key: String) -> GroupSummary {
        let total = self.succeeded + self.failed + self.running + self.cancelled + self.other;
        let finished = self.succeeded + self.failed;
        let success_rate = if finished > 0 {
            Some(self.succeeded as f64 / finished as f64)
        } else {
            None
        };
        GroupSummary {
            key,
            total,
            succeeded: self.succeeded,
            failed: self.failed,
            running: self.running,
            cancelled: self.cancelled,
            other: self.other,
            success_rate,
        }
    }
}
