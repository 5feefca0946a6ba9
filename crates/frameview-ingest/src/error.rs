//! Error types for dataset ingestion.

use std::path::PathBuf;

use frameview_model::ModelError;
use thiserror::Error;

/// Errors that can occur while loading datasets.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Path is neither a CSV file nor a directory.
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// The csv reader rejected the input.
    #[error("failed to parse CSV {origin}: {source}")]
    CsvParse {
        origin: String,
        #[source]
        source: csv::Error,
    },

    /// Fewer rows than the configured header rows.
    #[error("CSV input has no header: {origin}")]
    EmptyCsv { origin: String },

    /// Delimiters must be a single ASCII character.
    #[error("invalid delimiter '{delimiter}': must be a single ASCII character")]
    InvalidDelimiter { delimiter: char },

    // === Dataset Errors ===
    /// A requested index column is not in the header.
    #[error("index column '{column}' not found in {origin}")]
    UnknownIndexColumn { column: String, origin: String },

    /// The parsed cells do not form a valid dataset.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
