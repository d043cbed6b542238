//! Input/output helpers.
//!
//! - CSV ingest into raw run rows (`ingest`)

pub mod ingest;

pub use ingest::*;
