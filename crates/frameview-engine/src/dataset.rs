//! The stateful dataset wrapper driven by the viewer.

use std::fmt;
use std::rc::Rc;

use frameview_model::{Dataset, Value};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::filter::{FilterExpression, FilterPipeline};
use crate::observer::{ObserverId, ViewObserver, ViewObserverRegistry};
use crate::sort::{OriginalOrder, SortState, SortTarget};
use crate::stats::{ColumnStats, describe};
use crate::view::View;

/// A dataset plus its interactive state: filters, sort and attached views.
///
/// The unfiltered data is never reordered. The visible rows are recomputed
/// from it after every mutation as `filters -> original order -> sort`, and
/// attached observers are refreshed exactly once per successful mutation.
/// A rejected mutation leaves everything untouched and notifies nobody.
pub struct TabularDataset {
    name: String,
    unfiltered: Dataset,
    original_order: OriginalOrder,
    pipeline: FilterPipeline,
    sort: SortState,
    view: Vec<usize>,
    editable: bool,
    observers: ViewObserverRegistry,
}

impl TabularDataset {
    pub fn new(name: impl Into<String>, dataset: Dataset) -> Self {
        let mut wrapped = Self {
            name: name.into(),
            original_order: OriginalOrder::capture(&dataset),
            view: (0..dataset.height()).collect(),
            unfiltered: dataset,
            pipeline: FilterPipeline::new(),
            sort: SortState::default(),
            editable: true,
            observers: ViewObserverRegistry::new(),
        };
        wrapped.recompute();
        wrapped
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// All rows, in their original order, regardless of filters and sort.
    pub fn unfiltered(&self) -> &Dataset {
        &self.unfiltered
    }

    pub fn filters(&self) -> &[FilterExpression] {
        self.pipeline.filters()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn current_view(&self) -> View<'_> {
        View::new(&self.unfiltered, &self.view)
    }

    /// Summary statistics over the visible rows.
    pub fn statistics(&self) -> Result<Vec<ColumnStats>> {
        describe(&self.current_view())
    }

    /// Writes `value` at view row `row`, column `col`.
    ///
    /// The value is coerced to the column type, widening the column when it
    /// cannot be held. The edited row may leave the view if a filter no
    /// longer accepts it.
    pub fn edit_cell(&mut self, row: usize, col: usize, value: impl Into<Value>) -> Result<()> {
        if !self.editable {
            return Err(EngineError::ReadOnly {
                name: self.name.clone(),
            });
        }
        let source = self
            .view
            .get(row)
            .copied()
            .ok_or_else(|| EngineError::out_of_range("row", row, self.view.len()))?;
        if col >= self.unfiltered.width() {
            return Err(EngineError::out_of_range(
                "column",
                col,
                self.unfiltered.width(),
            ));
        }
        self.unfiltered.set_cell(source, col, value.into())?;
        debug!(dataset = %self.name, row, source, col, "cell edited");
        self.commit();
        Ok(())
    }

    pub fn add_filter(&mut self, text: impl Into<String>) {
        self.pipeline.add(text);
        self.commit();
    }

    pub fn remove_filter(&mut self, index: usize) -> Result<FilterExpression> {
        let removed = self.pipeline.remove(index)?;
        self.commit();
        Ok(removed)
    }

    /// Replaces a filter's text. A previously failed filter gets another try.
    pub fn edit_filter(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.pipeline.edit(index, text)?;
        self.commit();
        Ok(())
    }

    /// Enables or disables a filter, returning the new state.
    pub fn toggle_filter(&mut self, index: usize) -> Result<bool> {
        let enabled = self.pipeline.toggle(index)?;
        self.commit();
        Ok(enabled)
    }

    /// Advances the sort cycle for a column or an index level.
    ///
    /// Selecting the active target moves ascending to descending and
    /// descending back to the original order. Any other target starts
    /// ascending and replaces the current one.
    pub fn sort_by(&mut self, position: usize, is_index_level: bool) -> Result<SortState> {
        let (what, len) = if is_index_level {
            ("index level", self.unfiltered.index_level_count())
        } else {
            ("column", self.unfiltered.width())
        };
        if position >= len {
            return Err(EngineError::out_of_range(what, position, len));
        }
        self.sort.cycle(SortTarget::new(position, is_index_level));
        debug!(dataset = %self.name, sort = ?self.sort, "sort changed");
        self.commit();
        Ok(self.sort)
    }

    /// Registers a view. It is refreshed immediately so that it starts
    /// from the current state.
    pub fn attach<O: ViewObserver + 'static>(&mut self, observer: &Rc<O>) -> ObserverId {
        let id = self.observers.attach(observer);
        observer.refresh(self);
        id
    }

    pub fn detach(&mut self, id: ObserverId) -> bool {
        self.observers.detach(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Refreshes every attached view without changing any state.
    pub fn refresh(&self) -> usize {
        self.observers.notify(self)
    }

    fn commit(&mut self) {
        self.recompute();
        let refreshed = self.observers.notify(self);
        debug!(dataset = %self.name, refreshed, "views refreshed");
    }

    fn recompute(&mut self) {
        let mut rows = self.pipeline.apply(&self.unfiltered);
        self.original_order.restore(&self.unfiltered, &mut rows);
        self.sort.order(&self.unfiltered, &mut rows);
        debug!(
            dataset = %self.name,
            total = self.unfiltered.height(),
            visible = rows.len(),
            "view recomputed"
        );
        self.view = rows;
    }
}

impl fmt::Debug for TabularDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularDataset")
            .field("name", &self.name)
            .field("rows", &self.unfiltered.height())
            .field("visible", &self.view.len())
            .field("filters", &self.pipeline.len())
            .field("sort", &self.sort)
            .field("editable", &self.editable)
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use frameview_model::Column;

    use super::*;

    struct Counter(Cell<usize>);

    impl ViewObserver for Counter {
        fn refresh(&self, _dataset: &TabularDataset) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn people() -> TabularDataset {
        let ds = Dataset::new(vec![
            Column::from_values("name", ["ann", "bob", "cid"]),
            Column::from_values("age", [31_i64, 25, 40]),
        ])
        .unwrap();
        TabularDataset::new("people", ds)
    }

    #[test]
    fn read_only_rejects_edit() {
        let mut ds = people().with_editable(false);
        let err = ds.edit_cell(0, 0, "zed").unwrap_err();
        assert!(matches!(err, EngineError::ReadOnly { .. }));
    }

    #[test]
    fn rejected_mutation_does_not_notify() {
        let mut ds = people();
        let counter = Rc::new(Counter(Cell::new(0)));
        ds.attach(&counter);
        assert_eq!(counter.0.get(), 1);

        assert!(ds.sort_by(2, false).is_err());
        assert!(ds.sort_by(1, true).is_err());
        assert!(ds.edit_cell(3, 0, 1_i64).is_err());
        assert!(ds.toggle_filter(0).is_err());
        assert_eq!(counter.0.get(), 1);
        assert_eq!(ds.sort_state(), SortState::Unsorted);
    }

    #[test]
    fn edit_goes_through_the_view() {
        let mut ds = people();
        ds.sort_by(1, false).unwrap();
        // view: bob(25), ann(31), cid(40)
        ds.edit_cell(0, 0, "bea").unwrap();
        assert_eq!(ds.unfiltered().cell(1, 0), Some(&Value::text("bea")));
    }

    #[test]
    fn dropped_observer_is_skipped() {
        let mut ds = people();
        let counter = Rc::new(Counter(Cell::new(0)));
        ds.attach(&counter);
        drop(counter);
        ds.add_filter("age > 30");
        assert_eq!(ds.refresh(), 0);
        assert_eq!(ds.observer_count(), 0);
    }
}
