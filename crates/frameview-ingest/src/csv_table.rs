use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder};
use frameview_model::{Column, ColumnLabel, DType, Dataset, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Cell texts read as missing values unless overridden.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "-NaN", "n/a", "nan", "-nan", "null",
    "None",
];

/// How CSV text is turned into a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field separator, a single ASCII character.
    pub delimiter: char,

    /// Leading rows that make up the column labels, one per label level.
    pub header_rows: usize,

    /// Columns moved into the row index, outermost level first.
    pub index_columns: Vec<String>,

    /// Cell texts read as null.
    pub na_values: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            header_rows: 1,
            index_columns: Vec::new(),
            na_values: DEFAULT_NA_VALUES.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}

impl IngestOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_index_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    fn reader_builder(&self) -> Result<ReaderBuilder> {
        if !self.delimiter.is_ascii() {
            return Err(IngestError::InvalidDelimiter {
                delimiter: self.delimiter,
            });
        }
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter as u8);
        Ok(builder)
    }

    fn is_na(&self, cell: &str) -> bool {
        self.na_values.iter().any(|na| na == cell)
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a CSV file into a dataset.
pub fn read_csv_dataset(path: &Path, options: &IngestOptions) -> Result<Dataset> {
    let origin = path.display().to_string();
    let reader = options
        .reader_builder()?
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            origin: origin.clone(),
            source,
        })?;
    build_dataset(reader, &origin, options)
}

/// Reads CSV text into a dataset.
pub fn read_csv_str(text: &str, options: &IngestOptions) -> Result<Dataset> {
    let reader = options.reader_builder()?.from_reader(text.as_bytes());
    build_dataset(reader, "<string>", options)
}

fn build_dataset<R: Read>(
    mut reader: Reader<R>,
    origin: &str,
    options: &IngestOptions,
) -> Result<Dataset> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            origin: origin.to_string(),
            source,
        })?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    let header_rows = options.header_rows.max(1);
    if rows.len() < header_rows {
        return Err(IngestError::EmptyCsv {
            origin: origin.to_string(),
        });
    }
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let (header, body) = rows.split_at(header_rows);
    let labels = column_labels(header, width);
    debug!(origin, width, rows = body.len(), "csv records read");

    let mut columns = Vec::with_capacity(width);
    for (col, levels) in labels.into_iter().enumerate() {
        let cells = body
            .iter()
            .map(|row| row.get(col).map_or("", String::as_str));
        columns.push(infer_column(ColumnLabel::new(levels)?, cells, options));
    }

    let mut dataset = Dataset::new(columns)?;
    if !options.index_columns.is_empty() {
        let positions = options
            .index_columns
            .iter()
            .map(|name| {
                dataset
                    .column_position(name)
                    .ok_or_else(|| IngestError::UnknownIndexColumn {
                        column: name.clone(),
                        origin: origin.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        dataset = dataset.set_index(&positions)?;
    }

    info!(
        origin,
        rows = dataset.height(),
        columns = dataset.width(),
        "csv loaded"
    );
    Ok(dataset)
}

/// Builds one label per column from the header rows.
///
/// Blank cells in outer levels repeat the label to their left, so a grouped
/// header only needs to name each group once. A blank innermost level gets a
/// positional `Unnamed: n` name, and repeated labels are numbered `name.1`,
/// `name.2` and so on.
fn column_labels(header: &[Vec<String>], width: usize) -> Vec<Vec<String>> {
    let depth = header.len();
    let mut labels: Vec<Vec<String>> = Vec::with_capacity(width);
    for col in 0..width {
        let mut levels = Vec::with_capacity(depth);
        for (level, row) in header.iter().enumerate() {
            let text = row.get(col).map(|raw| normalize_header(raw)).unwrap_or_default();
            let text = if !text.is_empty() {
                text
            } else if level + 1 < depth {
                labels
                    .last()
                    .map(|previous| previous[level].clone())
                    .unwrap_or_default()
            } else {
                format!("Unnamed: {col}")
            };
            levels.push(text);
        }
        labels.push(levels);
    }

    for col in 1..labels.len() {
        let mut suffix = 0;
        let base = labels[col].clone();
        while labels[..col].contains(&labels[col]) {
            suffix += 1;
            let last = labels[col].len() - 1;
            labels[col][last] = format!("{}.{suffix}", base[last]);
        }
    }
    labels
}

/// Parses the cells of one column and picks its type.
///
/// Cells are read as booleans or numbers where possible. A column whose
/// parsed cells do not agree on a type keeps its original text.
fn infer_column<'a>(
    label: ColumnLabel,
    cells: impl Iterator<Item = &'a str> + Clone,
    options: &IngestOptions,
) -> Column {
    let parsed: Vec<Value> = cells
        .clone()
        .map(|cell| {
            if options.is_na(cell) {
                Value::Null
            } else {
                Value::parse_literal(cell)
            }
        })
        .collect();
    let has_values = parsed.iter().any(|value| !value.is_null());
    if !has_values || DType::infer(&parsed) != DType::Mixed {
        return Column::new(label, parsed);
    }
    let text = cells
        .map(|cell| {
            if options.is_na(cell) {
                Value::Null
            } else {
                Value::text(cell)
            }
        })
        .collect();
    Column::new(label, text)
}
