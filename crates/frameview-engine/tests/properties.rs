//! Property tests for the filter pipeline and the sort cycle.

use frameview_engine::{SortState, TabularDataset};
use frameview_model::{Column, Dataset, Label, Value};
use proptest::prelude::*;

fn wrap(values: &[Option<i64>]) -> TabularDataset {
    let ds = Dataset::new(vec![
        Column::from_values("x", values.iter().copied()),
        Column::from_values("pos", 0..values.len() as i64),
    ])
    .unwrap();
    TabularDataset::new("prop", ds)
}

/// Rows keyed by labels drawn from a small set, so most labels repeat.
fn wrap_keyed(values: &[Option<i64>], keys: &[i64]) -> TabularDataset {
    let labels = keys.iter().map(|&key| Label::single(key)).collect();
    let ds = Dataset::new(vec![Column::from_values("x", values.iter().copied())])
        .unwrap()
        .with_index(labels, vec![Some("key".to_string())])
        .unwrap();
    TabularDataset::new("prop", ds)
}

fn keyed_rows() -> impl Strategy<Value = (Vec<Option<i64>>, Vec<i64>)> {
    column_values().prop_flat_map(|values| {
        let len = values.len();
        (Just(values), prop::collection::vec(0_i64..4, len))
    })
}

fn visible(ds: &TabularDataset) -> Vec<usize> {
    ds.current_view().source_rows().to_vec()
}

fn column_values() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.85, -50_i64..50), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn filters_compose_as_intersection(values in column_values(), low in -60_i64..60, high in -60_i64..60) {
        let mut ds = wrap(&values);
        ds.add_filter(format!("x > {low}"));
        ds.add_filter(format!("x < {high}"));

        let expected: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some_and(|v| v > low && v < high))
            .map(|(row, _)| row)
            .collect();
        prop_assert_eq!(visible(&ds), expected);
    }

    #[test]
    fn toggling_a_filter_off_restores_the_view(values in column_values(), threshold in -60_i64..60) {
        let mut ds = wrap(&values);
        ds.sort_by(0, false).unwrap();
        let before = visible(&ds);

        ds.add_filter(format!("x >= {threshold}"));
        prop_assert!(!ds.toggle_filter(0).unwrap());
        prop_assert_eq!(visible(&ds), before);
    }

    #[test]
    fn three_sort_clicks_restore_original_order(values in column_values()) {
        let mut ds = wrap(&values);
        let original = visible(&ds);

        ds.sort_by(0, false).unwrap();
        ds.sort_by(0, false).unwrap();
        prop_assert_eq!(ds.sort_by(0, false).unwrap(), SortState::Unsorted);
        prop_assert_eq!(visible(&ds), original);
    }

    #[test]
    fn ascending_sort_is_ordered_with_nulls_last(values in column_values()) {
        let mut ds = wrap(&values);
        ds.sort_by(0, false).unwrap();
        let view = ds.current_view();
        let sorted: Vec<Option<i64>> = (0..view.height())
            .map(|row| match view.cell(row, 0) {
                Some(Value::Int(v)) => Some(*v),
                _ => None,
            })
            .collect();

        let nulls = sorted.iter().filter(|v| v.is_none()).count();
        prop_assert!(sorted[sorted.len() - nulls..].iter().all(Option::is_none));
        let present: Vec<i64> = sorted.iter().flatten().copied().collect();
        prop_assert!(present.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn edits_address_visible_rows(values in column_values(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!values.is_empty());
        let mut ds = wrap(&values);
        ds.sort_by(0, false).unwrap();
        ds.sort_by(0, false).unwrap();

        let row = pick.index(ds.current_view().height());
        let source = ds.current_view().source_row(row).unwrap();
        ds.edit_cell(row, 1, -1_i64).unwrap();
        prop_assert_eq!(ds.unfiltered().cell(source, 1), Some(&Value::Int(-1)));
    }

    #[test]
    fn repeated_labels_restore_original_order((values, keys) in keyed_rows(), threshold in -60_i64..60) {
        let mut ds = wrap_keyed(&values, &keys);
        let all: Vec<usize> = (0..values.len()).collect();
        prop_assert_eq!(visible(&ds), all.clone());

        ds.add_filter(format!("x >= {threshold}"));
        let filtered = visible(&ds);
        prop_assert!(filtered.windows(2).all(|pair| pair[0] < pair[1]));

        for _ in 0..3 {
            ds.sort_by(0, true).unwrap();
        }
        prop_assert_eq!(visible(&ds), filtered);
        for _ in 0..3 {
            ds.sort_by(0, false).unwrap();
        }
        ds.remove_filter(0).unwrap();
        prop_assert_eq!(visible(&ds), all);
    }
}
