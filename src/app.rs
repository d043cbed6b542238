//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs the tracing subscriber
//! - parses CLI arguments
//! - runs the load-and-aggregate cycle (once, or on a watch interval)
//! - prints reports
//! - writes demonstration data on request

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, SampleArgs, ShowArgs, WatchArgs};
use crate::config::AppConfig;
use crate::domain::RunFilter;
use crate::error::DataError;
use crate::report::format;

pub mod pipeline;

/// Entry point for the `flowmon` binary.
pub fn run() -> Result<(), DataError> {
    init_tracing();

    // Bare `flowmon` (or `flowmon --date ...`) should behave like
    // `flowmon show ...`. Clap requires a subcommand name, so we do a small,
    // explicit rewrite of the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Watch(args) => handle_watch(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flow_monitor=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_show(args: ShowArgs) -> Result<(), DataError> {
    let config = config_from_args(&args);
    let output = pipeline::run_cycle(&config, &cycle_request(&args))?;
    print!("{}", format::format_summary(&output.dataset, output.status));
    print!("{}", format::format_aggregate(&output.view));
    Ok(())
}

fn handle_watch(args: WatchArgs) -> Result<(), DataError> {
    if args.interval == 0 {
        return Err(DataError::Config(
            "watch interval must be greater than zero seconds".to_string(),
        ));
    }
    let config = config_from_args(&args.show);
    let request = cycle_request(&args.show);
    let interval = Duration::from_secs(args.interval);

    // Strictly sequential: a cycle finishes (or fails) before the next
    // sleep starts, so refreshes can never overlap.
    loop {
        match pipeline::run_cycle(&config, &request) {
            Ok(output) => {
                print!("{}", format::format_summary(&output.dataset, output.status));
                print!("{}", format::format_aggregate(&output.view));
            }
            Err(e) => {
                tracing::error!(error = %e, "refresh cycle failed");
                print!("{}", format::format_cycle_failure(&e));
            }
        }
        std::thread::sleep(interval);
    }
}

fn handle_sample(args: SampleArgs) -> Result<(), DataError> {
    let date = args.date.unwrap_or_else(today);
    let path = crate::data::sample::write_sample_csv(&args.dir, date, args.seed)?;
    println!("Sample data written to {}", path.display());
    Ok(())
}

fn config_from_args(args: &ShowArgs) -> AppConfig {
    let config = AppConfig::from_env();
    if args.csv_only { config.csv_only() } else { config }
}

fn cycle_request(args: &ShowArgs) -> pipeline::CycleRequest {
    pipeline::CycleRequest {
        date: args.date.unwrap_or_else(today),
        filter: RunFilter {
            project: args.project.clone(),
            status: args.status,
        },
        group_by: args.group_by,
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rewrite argv so `flowmon` defaults to `flowmon show`.
///
/// Rules:
/// - `flowmon`                      -> `flowmon show`
/// - `flowmon --date ...`           -> `flowmon show --date ...`
/// - `flowmon --help/--version/-h`  -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("show".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "watch" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "show flags".
    if arg1.starts_with('-') {
        argv.insert(1, "show".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
