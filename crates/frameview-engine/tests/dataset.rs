//! Scenario tests for the tabular dataset and its attached views.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use frameview_engine::{
    EngineError, ProjectionSet, SortDirection, SortState, SortTarget, Store, TabularDataset,
    ViewObserver,
};
use frameview_model::{Column, Dataset, Label, Settings, Value};

fn people() -> Dataset {
    Dataset::new(vec![
        Column::from_values("name", ["ann", "bob", "cid", "dee", "eve"]),
        Column::from_values("age", [45_i64, 22, 31, 67, 19]),
        Column::from_values("city", ["Oslo", "Rome", "Oslo", "Lima", "Rome"]),
    ])
    .unwrap()
}

fn names(ds: &TabularDataset) -> Vec<String> {
    let view = ds.current_view();
    (0..view.height())
        .map(|row| view.cell(row, 0).map(ToString::to_string).unwrap_or_default())
        .collect()
}

/// Records the visible row count seen on each refresh.
#[derive(Default)]
struct Recorder {
    calls: Cell<usize>,
    heights: RefCell<Vec<usize>>,
}

impl ViewObserver for Recorder {
    fn refresh(&self, dataset: &TabularDataset) {
        self.calls.set(self.calls.get() + 1);
        self.heights
            .borrow_mut()
            .push(dataset.current_view().height());
    }
}

#[test]
fn filtered_sort_cycle_keeps_filter() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("age > 30");
    assert_eq!(names(&ds), ["ann", "cid", "dee"]);

    ds.sort_by(1, false).unwrap();
    assert_eq!(names(&ds), ["cid", "ann", "dee"]);

    ds.sort_by(1, false).unwrap();
    assert_eq!(names(&ds), ["dee", "ann", "cid"]);

    assert_eq!(ds.sort_by(1, false).unwrap(), SortState::Unsorted);
    assert_eq!(names(&ds), ["ann", "cid", "dee"]);
    assert_eq!(ds.unfiltered().height(), 5);

    ds.remove_filter(0).unwrap();
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee", "eve"]);
}

#[test]
fn repeated_index_labels_keep_their_order() {
    let by_city = people().set_index(&[2]).unwrap();
    let mut ds = TabularDataset::new("people", by_city);
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee", "eve"]);

    ds.add_filter("age > 20");
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee"]);

    ds.sort_by(1, false).unwrap();
    assert_eq!(names(&ds), ["bob", "cid", "ann", "dee"]);
    ds.sort_by(1, false).unwrap();
    assert_eq!(names(&ds), ["dee", "ann", "cid", "bob"]);
    ds.sort_by(1, false).unwrap();
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee"]);

    ds.sort_by(0, true).unwrap();
    assert_eq!(names(&ds), ["dee", "ann", "cid", "bob"]);
    ds.sort_by(0, true).unwrap();
    ds.sort_by(0, true).unwrap();
    ds.remove_filter(0).unwrap();
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee", "eve"]);
}

#[test]
fn type_error_behind_and_marks_filter_failed() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("age > 100 and name > 5");
    assert!(ds.filters()[0].has_failed());
    assert_eq!(ds.current_view().height(), 5);
}

#[test]
fn switching_target_starts_ascending() {
    let mut ds = TabularDataset::new("people", people());
    ds.sort_by(1, false).unwrap();
    let state = ds.sort_by(0, false).unwrap();
    assert_eq!(
        state,
        SortState::Sorted {
            target: SortTarget::Column(0),
            direction: SortDirection::Ascending
        }
    );
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee", "eve"]);
}

#[test]
fn failed_filter_is_cleared_by_edit() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("age >");
    assert!(ds.filters()[0].has_failed());
    assert_eq!(ds.current_view().height(), 5);

    ds.edit_filter(0, "city == 'Oslo'").unwrap();
    assert!(!ds.filters()[0].has_failed());
    assert_eq!(names(&ds), ["ann", "cid"]);
}

#[test]
fn edit_can_hide_the_edited_row() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("age > 30");
    // view row 1 is cid
    ds.edit_cell(1, 1, 12_i64).unwrap();
    assert_eq!(names(&ds), ["ann", "dee"]);
    assert_eq!(ds.unfiltered().cell(2, 1), Some(&Value::Int(12)));
}

#[test]
fn edit_hidden_row_is_out_of_range() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("city == 'Lima'");
    let err = ds.edit_cell(1, 0, "zed").unwrap_err();
    assert!(matches!(
        err,
        EngineError::OutOfRange {
            what: "row",
            index: 1,
            len: 1
        }
    ));
}

#[test]
fn edit_widens_column_type() {
    let mut ds = TabularDataset::new("people", people());
    ds.edit_cell(0, 1, 45.5).unwrap();
    assert_eq!(ds.unfiltered().column(1).unwrap().dtype().label(), "float64");
    ds.edit_cell(0, 1, "old").unwrap();
    assert_eq!(ds.unfiltered().column(1).unwrap().dtype().label(), "object");
}

#[test]
fn every_mutation_notifies_once() {
    let mut ds = TabularDataset::new("people", people());
    let first = Rc::new(Recorder::default());
    let second = Rc::new(Recorder::default());
    ds.attach(&first);
    ds.attach(&second);

    ds.add_filter("age > 20");
    ds.toggle_filter(0).unwrap();
    ds.toggle_filter(0).unwrap();
    ds.edit_filter(0, "age > 40").unwrap();
    ds.sort_by(0, false).unwrap();
    ds.edit_cell(0, 2, "Pisa").unwrap();
    ds.remove_filter(0).unwrap();

    // one refresh on attach plus seven mutations
    assert_eq!(first.calls.get(), 8);
    assert_eq!(second.calls.get(), 8);
    assert_eq!(*first.heights.borrow(), vec![5, 4, 5, 4, 2, 2, 2, 5]);

    assert!(ds.sort_by(9, false).is_err());
    assert!(ds.remove_filter(0).is_err());
    assert_eq!(first.calls.get(), 8);
}

#[test]
fn index_level_sort_cycle() {
    let labels = ["c", "a", "b", "a", "c"]
        .into_iter()
        .zip(1_i64..)
        .map(|(key, n)| Label::new(vec![Value::text(key), Value::Int(n)]).unwrap())
        .collect();
    let data = people()
        .with_index(labels, vec![Some("key".into()), Some("n".into())])
        .unwrap();
    let mut ds = TabularDataset::new("people", data);

    ds.sort_by(0, true).unwrap();
    assert_eq!(names(&ds), ["bob", "dee", "cid", "ann", "eve"]);
    ds.sort_by(0, true).unwrap();
    assert_eq!(names(&ds), ["eve", "ann", "cid", "dee", "bob"]);
    ds.sort_by(0, true).unwrap();
    assert_eq!(names(&ds), ["ann", "bob", "cid", "dee", "eve"]);
    assert!(ds.sort_by(2, true).is_err());
}

#[test]
fn statistics_follow_the_view() {
    let mut ds = TabularDataset::new("people", people());
    ds.add_filter("city == 'Rome'");
    let stats = ds.statistics().unwrap();
    assert_eq!(stats[1].count, 2);
    assert_eq!(stats[1].min, Some(19.0));
    assert_eq!(stats[1].max, Some(22.0));
    assert_eq!(stats[2].dtype, "string");
}

#[test]
fn projections_render_current_state() {
    let mut ds = TabularDataset::new("people", people());
    let set = ProjectionSet::attach(&mut ds, 3);
    ds.add_filter("city != 'Lima'");
    ds.add_filter("nope == 1");
    ds.sort_by(1, false).unwrap();
    ds.sort_by(1, false).unwrap();

    let mut lines = vec![set.column_header.labels().join(" | ")];
    for (label, row) in set.index_header.labels().iter().zip(set.grid.cells().iter()) {
        lines.push(format!("{} | {}", label.join("."), row.join(" | ")));
    }
    lines.push(format!("({} rows)", set.grid.total_rows()));
    lines.extend(set.filter_list.entries().iter().cloned());

    insta::assert_snapshot!(lines.join("\n"), @r"
    name | age ▼ | city
    0 | ann | 45 | Oslo
    2 | cid | 31 | Oslo
    1 | bob | 22 | Rome
    (4 rows)
    [x] city != 'Lima'
    [!] nope == 1
    ");
}

#[test]
fn store_snapshot_lists_state() {
    let mut store = Store::new(Settings::default().with_editable(false));
    let ds = store.add("people", people()).unwrap();
    ds.add_filter("age > 30");
    ds.sort_by(1, false).unwrap();
    assert!(matches!(
        ds.edit_cell(0, 0, "x"),
        Err(EngineError::ReadOnly { .. })
    ));

    let json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
    assert_eq!(json["settings"]["editable"], false);
    assert_eq!(json["datasets"][0]["name"], "people");
    assert_eq!(json["datasets"][0]["visible_rows"], 3);
    assert_eq!(json["datasets"][0]["filters"][0]["text"], "age > 30");
    assert_eq!(json["datasets"][0]["sort"]["state"], "sorted");
    assert_eq!(json["datasets"][0]["sort"]["direction"], "ascending");
}
