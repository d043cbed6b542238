//! Command-line parsing for the flow-run monitor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{GroupBy, RunStatus};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "flowmon", version, about = "Cloud Flow Run Monitor (DB/CSV-backed)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the selected date once and print the summary and aggregate view.
    Show(ShowArgs),
    /// Re-run the load-and-aggregate cycle on a fixed interval.
    ///
    /// Cycles run strictly one after another; a slow load delays the next
    /// tick instead of overlapping it.
    Watch(WatchArgs),
    /// Write a seeded demonstration flow_data_<date>.csv.
    Sample(SampleArgs),
}

/// Common options for one load-and-aggregate cycle.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Date to display (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Grouping dimension for the aggregate view.
    #[arg(short, long, value_enum, default_value_t = GroupBy::Project)]
    pub group_by: GroupBy,

    /// Only show runs of this project.
    #[arg(long)]
    pub project: Option<String>,

    /// Only show runs with this (normalized) status.
    #[arg(long, value_enum)]
    pub status: Option<RunStatus>,

    /// Skip the database probe and read straight from CSV.
    #[arg(long)]
    pub csv_only: bool,
}

/// Options for the auto-refresh loop.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    #[command(flatten)]
    pub show: ShowArgs,

    /// Refresh interval in seconds (must be > 0).
    #[arg(long, default_value_t = 300)]
    pub interval: u64,
}

/// Options for demonstration data generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Directory to write the file into.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Date the generated runs fall on (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// RNG seed; the same seed reproduces the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
