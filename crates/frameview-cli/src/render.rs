//! Terminal tables for views, statistics and filter lists.

use clap::ColorChoice;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use frameview_engine::{ColumnStats, ProjectionSet, STATS_HEADER, TabularDataset};
use frameview_model::DType;

/// Renders the rows held by `views` as a table plus a row-count footer.
pub fn render_view(dataset: &TabularDataset, views: &ProjectionSet, color: ColorChoice) -> String {
    let mut table = new_table(color);
    let index_names = views.index_header_names.names();
    let column_levels = views.column_header.levels();

    let mut header: Vec<Cell> = index_names.iter().map(|name| index_cell(name)).collect();
    let width = column_levels.first().map_or(0, Vec::len);
    for col in 0..width {
        let label = column_levels
            .iter()
            .map(|level| level[col].as_str())
            .collect::<Vec<_>>()
            .join("\n");
        header.push(header_cell(&label));
    }
    table.set_header(header);

    let index_labels = views.index_header.labels();
    for (label, cells) in index_labels.iter().zip(views.grid.cells().iter()) {
        let mut row: Vec<Cell> = label.iter().map(|level| index_cell(level)).collect();
        row.extend(cells.iter().map(Cell::new));
        table.add_row(row);
    }

    let data = dataset.unfiltered();
    let offset = index_names.len();
    for (col, column) in data.columns().iter().enumerate() {
        if matches!(column.dtype(), DType::Int | DType::Float) {
            align_column(&mut table, offset + col, CellAlignment::Right);
        }
    }

    let shown = views.grid.cells().len();
    let visible = views.grid.total_rows();
    let mut out = format!("{table}\n");
    out.push_str(&format!(
        "{}: {shown} of {visible} rows shown ({} total, {} columns)",
        dataset.name(),
        data.height(),
        data.width()
    ));
    let filters = views.filter_list.entries();
    if !filters.is_empty() {
        out.push_str("\nfilters:");
        for (position, entry) in filters.iter().enumerate() {
            out.push_str(&format!("\n  {position}: {entry}"));
        }
    }
    out
}

/// Renders column statistics, one row per column.
pub fn render_stats(stats: &[ColumnStats], color: ColorChoice) -> String {
    let mut table = new_table(color);
    table.set_header(STATS_HEADER.iter().map(|label| header_cell(label)));
    for column in stats {
        let [name, dtype, count, mean, std, min, max] = column.row();
        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            dim_cell(dtype),
            Cell::new(count),
            optional_cell(mean),
            optional_cell(std),
            optional_cell(min),
            optional_cell(max),
        ]);
    }
    for col in 2..STATS_HEADER.len() {
        align_column(&mut table, col, CellAlignment::Right);
    }
    table.to_string()
}

/// Renders a list of names, one per row.
pub fn render_list(title: &str, items: &[&str], color: ColorChoice) -> String {
    let mut table = new_table(color);
    table.set_header(vec![header_cell(title)]);
    for item in items {
        table.add_row(vec![Cell::new(item)]);
    }
    table.to_string()
}

fn new_table(color: ColorChoice) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    match color {
        ColorChoice::Always => {
            table.enforce_styling();
        }
        ColorChoice::Never => {
            table.force_no_tty();
        }
        ColorChoice::Auto => {}
    }
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn index_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: String) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
