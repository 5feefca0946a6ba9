//! Read-only projection of a dataset's current rows.

use frameview_model::{Column, ColumnLabel, Dataset, Label, Value};

/// The filtered and sorted rows of a dataset, borrowed.
///
/// Row positions are positions in the view; [`View::source_row`] maps them
/// back to the underlying dataset.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    dataset: &'a Dataset,
    rows: &'a [usize],
}

impl<'a> View<'a> {
    pub(crate) fn new(dataset: &'a Dataset, rows: &'a [usize]) -> Self {
        Self { dataset, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.dataset.width()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position in the underlying dataset of view row `row`.
    pub fn source_row(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }

    pub fn source_rows(&self) -> &'a [usize] {
        self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&'a Value> {
        self.dataset.cell(self.source_row(row)?, col)
    }

    pub fn row_label(&self, row: usize) -> Option<&'a Label> {
        self.dataset.row_label(self.source_row(row)?)
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &'a Label> + 'a {
        let index = self.dataset.index();
        self.rows.iter().map(move |&row| &index[row])
    }

    pub fn column(&self, col: usize) -> Option<&'a Column> {
        self.dataset.column(col)
    }

    pub fn column_labels(&self) -> impl Iterator<Item = &'a ColumnLabel> + 'a {
        self.dataset.columns().iter().map(Column::label)
    }

    /// Values of view row `row`, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<&'a Value>> {
        let source = self.source_row(row)?;
        Some(
            self.dataset
                .columns()
                .iter()
                .map(|column| &column.values()[source])
                .collect(),
        )
    }

    pub fn index_names(&self) -> &'a [Option<String>] {
        self.dataset.index_names()
    }

    pub fn column_names(&self) -> &'a [Option<String>] {
        self.dataset.column_names()
    }

    /// Copies the visible rows into an owned dataset.
    pub fn to_dataset(&self) -> Dataset {
        self.dataset.take(self.rows)
    }
}
