//! Error taxonomy for the dashboard pipeline

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading, aggregating or rendering.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An input file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table is missing one of its required columns.
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A required cell was empty or could not be read as its column type.
    #[error("Table '{table}' has no usable '{column}' value at row {row}")]
    MissingValue {
        table: String,
        column: String,
        row: usize,
    },

    /// A date cell did not match any accepted format.
    #[error("Table '{table}' has an invalid date in '{column}': {value:?}")]
    InvalidDate {
        table: String,
        column: String,
        value: String,
    },

    /// A numeric cell did not hold a number of the column's type.
    #[error("Table '{table}' has an invalid number in '{column}': {value:?}")]
    InvalidNumber {
        table: String,
        column: String,
        value: String,
    },

    #[error("Data frame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// The chart backend failed to draw or write the figure.
    #[error("Render error: {0}")]
    Render(String),
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for DashboardError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DashboardError::Render(err.to_string())
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, DashboardError>;
