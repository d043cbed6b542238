use std::path::PathBuf;

use thiserror::Error;

/// Top-level error taxonomy for the data core.
///
/// `Connectivity` is always recovered locally (CSV fallback) before it can
/// reach the user; the remaining variants surface as a message plus a
/// process exit code.
#[derive(Debug, Error)]
pub enum DataError {
    /// Database unreachable, credentials missing, or the probe query failed.
    #[error("database unavailable: {0}")]
    Connectivity(String),

    /// Neither a reachable database nor any matching CSV file exists.
    #[error("no data source available (database unreachable and no flow_data_*.csv found)")]
    NoDataSourceAvailable,

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Catch-all for failures inside a load that fit no other variant.
    #[error("load failed: {0}")]
    Load(String),
}

impl DataError {
    /// Exit code mapping: 2 = input/config error, 3 = no data, 4 = source error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DataError::Config(_) => 2,
            DataError::NoDataSourceAvailable => 3,
            DataError::Connectivity(_)
            | DataError::Io { .. }
            | DataError::Csv { .. }
            | DataError::Load(_) => 4,
        }
    }
}

/// A row-level rejection produced by the validator.
///
/// These never abort a load; they are accumulated into the dataset's
/// skipped-row count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}
