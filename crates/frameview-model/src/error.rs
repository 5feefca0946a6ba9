use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("{what} has {found} levels, expected {expected}")]
    LevelMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("label must have at least one level")]
    EmptyLabel,
    #[error("{what} {index} is out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
