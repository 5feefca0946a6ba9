//! Error types for the tabular engine.

use frameview_model::ModelError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Invalid filter text is not represented here: it is recorded on the
/// filter itself and never crosses the dataset boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A row, column, index level or filter position outside current bounds.
    #[error("{what} {index} is out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Cell edit on a dataset whose settings forbid editing.
    #[error("dataset `{name}` is read-only")]
    ReadOnly { name: String },

    /// Store already holds a dataset with this name.
    #[error("a dataset named `{name}` already exists")]
    DuplicateName { name: String },

    /// Store has no dataset with this name.
    #[error("no dataset named `{name}`")]
    UnknownDataset { name: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Aggregation failure while computing column statistics.
    #[error("statistics failed: {0}")]
    Statistics(#[from] PolarsError),

    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { what, index, len }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
