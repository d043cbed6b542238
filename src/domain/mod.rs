//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical run record (`FlowRunRecord`) and its raw precursor (`RawRun`)
//! - the normalized status vocabulary (`RunStatus`)
//! - load outputs (`Dataset`, `LoadStatus`)
//! - aggregate views (`AggregateView`, `GroupSummary`, `GroupBy`)

pub mod types;

pub use types::*;
