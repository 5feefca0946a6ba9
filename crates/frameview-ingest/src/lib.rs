//! Dataset sources for the frameview viewer.
//!
//! CSV text is read with the `csv` crate, cells are parsed into typed values
//! and each column gets the narrowest type that holds all of its cells.

pub mod csv_table;
pub mod discovery;
pub mod error;

pub use csv_table::{DEFAULT_NA_VALUES, IngestOptions, read_csv_dataset, read_csv_str};
pub use discovery::{dataset_name, list_csv_files, load_datasets};
pub use error::{IngestError, Result};
