//! Render-ready projections of a dataset, kept current through
//! [`ViewObserver`] notifications.
//!
//! Each projection caches plain strings on refresh and never holds row
//! positions across mutations.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::dataset::TabularDataset;
use crate::observer::{ObserverId, ViewObserver};
use crate::sort::SortDirection;

fn with_arrow(text: String, direction: Option<SortDirection>) -> String {
    match direction {
        Some(direction) if text.is_empty() => direction.arrow().to_string(),
        Some(direction) => format!("{text} {}", direction.arrow()),
        None => text,
    }
}

/// Cell text of the visible rows, optionally capped.
#[derive(Debug, Default)]
pub struct GridProjection {
    max_rows: Option<usize>,
    cells: RefCell<Vec<Vec<String>>>,
    total_rows: Cell<usize>,
    refreshes: Cell<usize>,
}

impl GridProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows: Some(max_rows),
            ..Self::default()
        }
    }

    /// Rendered rows, at most `max_rows` of them.
    pub fn cells(&self) -> Ref<'_, Vec<Vec<String>>> {
        self.cells.borrow()
    }

    /// Visible rows before the cap was applied.
    pub fn total_rows(&self) -> usize {
        self.total_rows.get()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for GridProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let view = dataset.current_view();
        let shown = self.max_rows.map_or(view.height(), |cap| cap.min(view.height()));
        let cells = (0..shown)
            .filter_map(|row| view.row(row))
            .map(|values| values.into_iter().map(ToString::to_string).collect())
            .collect();
        *self.cells.borrow_mut() = cells;
        self.total_rows.set(view.height());
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// Column labels, one row per label level, with the sort arrow on the
/// innermost level of the sorted column.
#[derive(Debug, Default)]
pub struct ColumnHeaderProjection {
    levels: RefCell<Vec<Vec<String>>>,
    refreshes: Cell<usize>,
}

impl ColumnHeaderProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Ref<'_, Vec<Vec<String>>> {
        self.levels.borrow()
    }

    /// Innermost level, which is what a single-row header shows.
    pub fn labels(&self) -> Vec<String> {
        self.levels.borrow().last().cloned().unwrap_or_default()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for ColumnHeaderProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let data = dataset.unfiltered();
        let sorted = dataset.sort_state().column();
        let depth = data.column_level_count();
        let levels = (0..depth)
            .map(|level| {
                data.columns()
                    .iter()
                    .enumerate()
                    .map(|(col, column)| {
                        let text = column.label().levels().get(level).cloned().unwrap_or_default();
                        let arrow = sorted
                            .filter(|&(sorted_col, _)| sorted_col == col && level + 1 == depth)
                            .map(|(_, direction)| direction);
                        with_arrow(text, arrow)
                    })
                    .collect()
            })
            .collect();
        *self.levels.borrow_mut() = levels;
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// Row labels of the visible rows, one entry per index level.
#[derive(Debug, Default)]
pub struct IndexHeaderProjection {
    labels: RefCell<Vec<Vec<String>>>,
    refreshes: Cell<usize>,
}

impl IndexHeaderProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Ref<'_, Vec<Vec<String>>> {
        self.labels.borrow()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for IndexHeaderProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let labels = dataset
            .current_view()
            .row_labels()
            .map(|label| label.levels().iter().map(ToString::to_string).collect())
            .collect();
        *self.labels.borrow_mut() = labels;
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// Names of the column label levels.
#[derive(Debug, Default)]
pub struct ColumnHeaderNamesProjection {
    names: RefCell<Vec<String>>,
    refreshes: Cell<usize>,
}

impl ColumnHeaderNamesProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Ref<'_, Vec<String>> {
        self.names.borrow()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for ColumnHeaderNamesProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let names = dataset
            .unfiltered()
            .column_names()
            .iter()
            .map(|name| name.clone().unwrap_or_default())
            .collect();
        *self.names.borrow_mut() = names;
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// Names of the index levels, with the sort arrow on the sorted level.
#[derive(Debug, Default)]
pub struct IndexHeaderNamesProjection {
    names: RefCell<Vec<String>>,
    refreshes: Cell<usize>,
}

impl IndexHeaderNamesProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Ref<'_, Vec<String>> {
        self.names.borrow()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for IndexHeaderNamesProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let sorted = dataset.sort_state().index_level();
        let names = dataset
            .unfiltered()
            .index_names()
            .iter()
            .enumerate()
            .map(|(level, name)| {
                let arrow = sorted
                    .filter(|&(sorted_level, _)| sorted_level == level)
                    .map(|(_, direction)| direction);
                with_arrow(name.clone().unwrap_or_default(), arrow)
            })
            .collect();
        *self.names.borrow_mut() = names;
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// One line per filter: `[x]` enabled, `[ ]` disabled, `[!]` failed.
#[derive(Debug, Default)]
pub struct FilterListProjection {
    entries: RefCell<Vec<String>>,
    refreshes: Cell<usize>,
}

impl FilterListProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Ref<'_, Vec<String>> {
        self.entries.borrow()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }
}

impl ViewObserver for FilterListProjection {
    fn refresh(&self, dataset: &TabularDataset) {
        let entries = dataset
            .filters()
            .iter()
            .map(|filter| {
                let mark = if filter.has_failed() {
                    "!"
                } else if filter.is_enabled() {
                    "x"
                } else {
                    " "
                };
                format!("[{mark}] {}", filter.text())
            })
            .collect();
        *self.entries.borrow_mut() = entries;
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

/// The full set of projections a table widget needs, attached together.
#[derive(Debug, Default)]
pub struct ProjectionSet {
    pub grid: Rc<GridProjection>,
    pub column_header: Rc<ColumnHeaderProjection>,
    pub index_header: Rc<IndexHeaderProjection>,
    pub column_header_names: Rc<ColumnHeaderNamesProjection>,
    pub index_header_names: Rc<IndexHeaderNamesProjection>,
    pub filter_list: Rc<FilterListProjection>,
    ids: Vec<ObserverId>,
}

impl ProjectionSet {
    /// Creates every projection and attaches it to `dataset`. The grid shows
    /// at most `max_rows` rows.
    pub fn attach(dataset: &mut TabularDataset, max_rows: usize) -> Self {
        let mut set = Self {
            grid: Rc::new(GridProjection::with_max_rows(max_rows)),
            ..Self::default()
        };
        set.ids = vec![
            dataset.attach(&set.grid),
            dataset.attach(&set.column_header),
            dataset.attach(&set.index_header),
            dataset.attach(&set.column_header_names),
            dataset.attach(&set.index_header_names),
            dataset.attach(&set.filter_list),
        ];
        set
    }

    pub fn detach(self, dataset: &mut TabularDataset) {
        for id in self.ids {
            dataset.detach(id);
        }
    }
}
