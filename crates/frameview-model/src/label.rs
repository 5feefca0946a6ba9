#![deny(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::{ModelError, Result};

/// Separator used when a multi-level label is shown as one string.
pub const LEVEL_SEPARATOR: &str = ".";

/// Row label; one value per index level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(Vec<Value>);

impl Label {
    pub fn new(levels: Vec<Value>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        Ok(Self(levels))
    }

    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    pub fn levels(&self) -> &[Value] {
        &self.0
    }

    pub fn level(&self, level: usize) -> Option<&Value> {
        self.0.get(level)
    }

    pub fn level_count(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(LEVEL_SEPARATOR)?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Column label; one name per column level.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ColumnLabel(Vec<String>);

impl ColumnLabel {
    pub fn new(levels: Vec<String>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        Ok(Self(levels))
    }

    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn levels(&self) -> &[String] {
        &self.0
    }

    pub fn level_count(&self) -> usize {
        self.0.len()
    }

    /// Name used to reference the column from a filter expression.
    pub fn display_name(&self) -> String {
        self.0.join(LEVEL_SEPARATOR)
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<&str> for ColumnLabel {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for ColumnLabel {
    fn from(value: String) -> Self {
        Self::single(value)
    }
}
