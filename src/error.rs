//! Error types shared by the solver library and the command line front-end.

use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Everything that can go wrong before or around a search run.
///
/// The search loop itself never fails on a well-formed instance, so every
/// variant here is raised at the boundary: while reading input files or
/// validating configuration.
#[derive(Debug, ThisError)]
pub enum SolverError {
    #[error("Error opening file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("distance matrix is empty")]
    EmptyMatrix,
    #[error("malformed matrix row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid distance {value:?} at row {row}, column {column}")]
    InvalidEntry {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("distance matrix is not square: {rows} rows, {columns} columns")]
    NotSquare { rows: usize, columns: usize },
    #[error("invalid coordinate on row {row}: {message}")]
    InvalidCoordinate { row: usize, message: String },
    #[error("{coordinates} coordinates given for a {dimension}-city matrix")]
    DimensionMismatch {
        coordinates: usize,
        dimension: usize,
    },
    #[error("tour cost may overflow: {dimension} cities, longest edge {max_distance}")]
    CostOverflow { dimension: usize, max_distance: u64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn open_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFile {
            path: path.into(),
            source,
        }
    }
}
