#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::label::{ColumnLabel, Label};
use crate::value::{DType, Value};
use crate::{ModelError, Result};

/// A named, typed sequence of cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    label: ColumnLabel,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    /// Builds a column and infers its type from the values.
    pub fn new(label: impl Into<ColumnLabel>, values: Vec<Value>) -> Self {
        let dtype = DType::infer(&values);
        let values = values
            .into_iter()
            .map(|value| dtype.coerce(value).unwrap_or_else(|original| original))
            .collect();
        Self {
            label: label.into(),
            dtype,
            values,
        }
    }

    pub fn from_values<T: Into<Value>>(
        label: impl Into<ColumnLabel>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::new(label, values.into_iter().map(Into::into).collect())
    }

    pub fn label(&self) -> &ColumnLabel {
        &self.label
    }

    pub fn name(&self) -> String {
        self.label.display_name()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores `value` at `row`, widening the column type when needed.
    pub fn set(&mut self, row: usize, value: Value) -> Result<()> {
        if row >= self.values.len() {
            return Err(ModelError::OutOfRange {
                what: "row",
                index: row,
                len: self.values.len(),
            });
        }
        let value = match self.dtype.coerce(value) {
            Ok(value) => value,
            Err(value) => {
                let target = value
                    .dtype()
                    .map_or(DType::Mixed, |dtype| self.dtype.widen(dtype));
                self.retype(target);
                target.coerce(value).unwrap_or_else(|original| original)
            }
        };
        self.values[row] = value;
        Ok(())
    }

    fn retype(&mut self, dtype: DType) {
        if dtype == self.dtype {
            return;
        }
        let values = std::mem::take(&mut self.values);
        self.values = values
            .into_iter()
            .map(|value| dtype.coerce(value).unwrap_or_else(|original| original))
            .collect();
        self.dtype = dtype;
    }

    fn take(&self, rows: &[usize]) -> Self {
        Self {
            label: self.label.clone(),
            dtype: self.dtype,
            values: rows.iter().map(|&row| self.values[row].clone()).collect(),
        }
    }
}

/// An in-memory table: ordered typed columns plus a labelled row index.
///
/// Row and column labels may have several levels. Level names are optional
/// and are shown in the index/column header-name strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    index: Vec<Label>,
    index_names: Vec<Option<String>>,
    column_names: Vec<Option<String>>,
}

impl Dataset {
    /// Builds a dataset with a `0..n` integer index.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        let levels = columns.first().map_or(1, |c| c.label().level_count());
        for column in &columns {
            if column.len() != height {
                return Err(ModelError::LengthMismatch {
                    column: column.name(),
                    expected: height,
                    found: column.len(),
                });
            }
            if column.label().level_count() != levels {
                return Err(ModelError::LevelMismatch {
                    what: "column label",
                    expected: levels,
                    found: column.label().level_count(),
                });
            }
        }
        let index = (0..height)
            .map(|row| Label::single(Value::Int(row as i64)))
            .collect();
        Ok(Self {
            columns,
            index,
            index_names: vec![None],
            column_names: vec![None; levels],
        })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: Vec::new(),
            index_names: vec![None],
            column_names: vec![None],
        }
    }

    /// Wraps a single column, the way a lone series is shown as a one-column table.
    pub fn from_column(column: Column) -> Self {
        let height = column.len();
        let levels = column.label().level_count();
        Self {
            columns: vec![column],
            index: (0..height)
                .map(|row| Label::single(Value::Int(row as i64)))
                .collect(),
            index_names: vec![None],
            column_names: vec![None; levels],
        }
    }

    /// Replaces the row index.
    pub fn with_index(mut self, index: Vec<Label>, names: Vec<Option<String>>) -> Result<Self> {
        if index.len() != self.height() {
            return Err(ModelError::LengthMismatch {
                column: "index".to_string(),
                expected: self.height(),
                found: index.len(),
            });
        }
        if names.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        if let Some(label) = index.iter().find(|l| l.level_count() != names.len()) {
            return Err(ModelError::LevelMismatch {
                what: "row label",
                expected: names.len(),
                found: label.level_count(),
            });
        }
        self.index = index;
        self.index_names = names;
        Ok(self)
    }

    /// Names the column label levels.
    pub fn with_column_names(mut self, names: Vec<Option<String>>) -> Result<Self> {
        if names.len() != self.column_names.len() {
            return Err(ModelError::LevelMismatch {
                what: "column names",
                expected: self.column_names.len(),
                found: names.len(),
            });
        }
        self.column_names = names;
        Ok(self)
    }

    /// Moves the given columns into the row index, one level per column.
    pub fn set_index(mut self, positions: &[usize]) -> Result<Self> {
        if positions.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        for &position in positions {
            if position >= self.columns.len() {
                return Err(ModelError::OutOfRange {
                    what: "column",
                    index: position,
                    len: self.columns.len(),
                });
            }
        }
        let names = positions
            .iter()
            .map(|&p| Some(self.columns[p].name()))
            .collect::<Vec<_>>();
        let index = (0..self.height())
            .map(|row| {
                Label::new(
                    positions
                        .iter()
                        .map(|&p| self.columns[p].values[row].clone())
                        .collect(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let mut kept = Vec::with_capacity(self.columns.len());
        for (position, column) in std::mem::take(&mut self.columns).into_iter().enumerate() {
            if !positions.contains(&position) {
                kept.push(column);
            }
        }
        self.columns = kept;
        self.index = index;
        self.index_names = names;
        Ok(self)
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    /// Position of the column whose display name is `name`.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label().display_name() == name)
    }

    pub fn index(&self) -> &[Label] {
        &self.index
    }

    pub fn row_label(&self, row: usize) -> Option<&Label> {
        self.index.get(row)
    }

    pub fn index_names(&self) -> &[Option<String>] {
        &self.index_names
    }

    pub fn column_names(&self) -> &[Option<String>] {
        &self.column_names
    }

    pub fn index_level_count(&self) -> usize {
        self.index_names.len()
    }

    pub fn column_level_count(&self) -> usize {
        self.column_names.len()
    }

    /// Position of the index level named `name`.
    pub fn index_level_position(&self, name: &str) -> Option<usize> {
        self.index_names
            .iter()
            .position(|level| level.as_deref() == Some(name))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.columns.get(col).and_then(|column| column.get(row))
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Value) -> Result<()> {
        let width = self.columns.len();
        let column = self.columns.get_mut(col).ok_or(ModelError::OutOfRange {
            what: "column",
            index: col,
            len: width,
        })?;
        column.set(row, value)
    }

    /// Copies the given rows, in the given order, into a new dataset.
    ///
    /// Every position must be below [`Dataset::height`].
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            index: rows.iter().map(|&row| self.index[row].clone()).collect(),
            index_names: self.index_names.clone(),
            column_names: self.column_names.clone(),
        }
    }
}
