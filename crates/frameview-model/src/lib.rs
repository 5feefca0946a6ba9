//! Core data types for frameview.
//!
//! - **value**: cell values and column types
//! - **label**: single- and multi-level row/column labels
//! - **table**: columns and datasets
//! - **options**: settings shared by a store of datasets

pub mod error;
pub mod label;
pub mod options;
pub mod table;
pub mod value;

pub use error::{ModelError, Result};
pub use label::{ColumnLabel, LEVEL_SEPARATOR, Label};
pub use options::{DEFAULT_MAX_ROWS, Settings};
pub use table::{Column, Dataset};
pub use value::{DType, Value, format_numeric};
