//! CSV file discovery.

use std::path::{Path, PathBuf};

use frameview_model::Dataset;
use tracing::info;

use crate::csv_table::{IngestOptions, read_csv_dataset};
use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::PathNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_csv(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Dataset name derived from a file path: its stem.
pub fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Loads one CSV file, or every CSV file of a directory, as named datasets.
pub fn load_datasets(path: &Path, options: &IngestOptions) -> Result<Vec<(String, Dataset)>> {
    let files = if path.is_dir() {
        list_csv_files(path)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(IngestError::PathNotFound {
            path: path.to_path_buf(),
        });
    };

    let mut datasets = Vec::with_capacity(files.len());
    for file in &files {
        datasets.push((dataset_name(file), read_csv_dataset(file, options)?));
    }
    info!(path = %path.display(), datasets = datasets.len(), "datasets loaded");
    Ok(datasets)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
