//! Data acquisition.
//!
//! Responsibilities:
//!
//! - probe and query the read-only run-history database (`db`)
//! - discover the most recent `flow_data_*.csv` fallback file (`discovery`)
//! - pick between the two at runtime (`select`)
//! - execute a load and classify its outcome (`loader`)
//! - generate demonstration CSVs (`sample`)

pub mod db;
pub mod discovery;
pub mod loader;
pub mod sample;
pub mod select;

pub use loader::*;
pub use select::*;
