//! Source selection: database first, CSV fallback.
//!
//! The decision is read-only and idempotent: a probe plus, if needed, a
//! directory scan. Nothing here opens a source for actual loading.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::{AppConfig, DbConfig};
use crate::data::{db, discovery};
use crate::domain::SourceKind;
use crate::error::DataError;

/// Where a load should read from, as decided by `select_source`.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    Db(DbConfig),
    Csv(PathBuf),
}

impl SourceDescriptor {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::Db(_) => SourceKind::Db,
            SourceDescriptor::Csv(_) => SourceKind::Csv,
        }
    }

    /// Connection target or file path, for provenance and logging.
    pub fn identifier(&self) -> String {
        match self {
            SourceDescriptor::Db(config) => config.database.clone(),
            SourceDescriptor::Csv(path) => path.display().to_string(),
        }
    }
}

/// Decide at runtime whether the database is usable; otherwise locate the
/// most recent matching CSV file.
///
/// Missing credentials are treated identically to a failed probe. Errors
/// with `NoDataSourceAvailable` when neither source exists.
pub fn select_source(
    config: &AppConfig,
    preferred_date: NaiveDate,
) -> Result<SourceDescriptor, DataError> {
    match &config.db {
        Some(db_config) => match db::probe(db_config, config.busy_timeout) {
            Ok(()) => {
                tracing::info!(database = %db_config.database, "using database source");
                return Ok(SourceDescriptor::Db(db_config.clone()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "database probe failed, falling back to CSV discovery");
            }
        },
        None => {
            tracing::warn!("database configuration incomplete, falling back to CSV discovery");
        }
    }
    discover_csv(config, preferred_date)
}

/// CSV half of the selection, also used by the loader's one-shot retry.
pub fn discover_csv(
    config: &AppConfig,
    preferred_date: NaiveDate,
) -> Result<SourceDescriptor, DataError> {
    let candidate =
        discovery::discover(&config.search_dirs).ok_or(DataError::NoDataSourceAvailable)?;
    if candidate.dated < preferred_date {
        tracing::warn!(
            file = %candidate.file_name,
            file_date = %candidate.dated,
            requested = %preferred_date,
            "fallback file predates the requested date"
        );
    }
    tracing::info!(file = %candidate.path.display(), "using CSV source");
    Ok(SourceDescriptor::Csv(candidate.path))
}
