//! Shared load-and-aggregate cycle used by `show` and `watch`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source selection -> load -> validation -> aggregation
//!
//! The CLI front-ends can then focus on presentation (printing vs looping).

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::data::loader;
use crate::domain::{AggregateView, Dataset, GroupBy, LoadStatus, RunFilter};
use crate::error::DataError;
use crate::report;

/// What one refresh cycle should load and how to summarize it.
#[derive(Debug, Clone)]
pub struct CycleRequest {
    pub date: NaiveDate,
    pub filter: RunFilter,
    pub group_by: GroupBy,
}

/// All computed outputs of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub dataset: Dataset,
    pub status: LoadStatus,
    pub view: AggregateView,
}

/// Execute one synchronous load-and-aggregate cycle.
pub fn run_cycle(config: &AppConfig, request: &CycleRequest) -> Result<CycleOutput, DataError> {
    let (dataset, status) = loader::load_with_fallback(config, request.date, &request.filter)?;
    let view = report::aggregate(&dataset, request.group_by);
    Ok(CycleOutput {
        dataset,
        status,
        view,
    })
}
