//! Interactive sort state and row ordering.
//!
//! Clicking the same header cycles ascending → descending → original order.
//! Clicking a different header, or switching between a column and an index
//! level, starts the new target at ascending.

use std::cmp::Ordering;
use std::collections::HashMap;

use frameview_model::{Dataset, Label, Value};
use serde::{Deserialize, Serialize};

/// What drives the ordering: a column position or an index level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "position", rename_all = "snake_case")]
pub enum SortTarget {
    Column(usize),
    IndexLevel(usize),
}

impl SortTarget {
    pub fn new(position: usize, is_index_level: bool) -> Self {
        if is_index_level {
            Self::IndexLevel(position)
        } else {
            Self::Column(position)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Current sort: none, or one target in one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted {
        target: SortTarget,
        direction: SortDirection,
    },
}

impl SortState {
    /// Advances the three-phase cycle for `target`.
    pub fn cycle(&mut self, target: SortTarget) {
        *self = match *self {
            Self::Sorted {
                target: current,
                direction: SortDirection::Ascending,
            } if current == target => Self::Sorted {
                target,
                direction: SortDirection::Descending,
            },
            Self::Sorted {
                target: current,
                direction: SortDirection::Descending,
            } if current == target => Self::Unsorted,
            _ => Self::Sorted {
                target,
                direction: SortDirection::Ascending,
            },
        };
    }

    pub fn is_sorted(&self) -> bool {
        matches!(self, Self::Sorted { .. })
    }

    /// Sorted column and its direction, if a column drives the order.
    pub fn column(&self) -> Option<(usize, SortDirection)> {
        match *self {
            Self::Sorted {
                target: SortTarget::Column(col),
                direction,
            } => Some((col, direction)),
            _ => None,
        }
    }

    /// Sorted index level and its direction, if a level drives the order.
    pub fn index_level(&self) -> Option<(usize, SortDirection)> {
        match *self {
            Self::Sorted {
                target: SortTarget::IndexLevel(level),
                direction,
            } => Some((level, direction)),
            _ => None,
        }
    }

    /// Stably reorders `rows` (positions into `dataset`). Unsorted leaves
    /// `rows` untouched.
    pub fn order(&self, dataset: &Dataset, rows: &mut [usize]) {
        let Self::Sorted { target, direction } = *self else {
            return;
        };
        match target {
            SortTarget::Column(col) => {
                let Some(column) = dataset.column(col) else {
                    return;
                };
                let values = column.values();
                rows.sort_by(|&a, &b| directed(&values[a], &values[b], direction));
            }
            SortTarget::IndexLevel(level) => {
                let index = dataset.index();
                rows.sort_by(|&a, &b| compare_labels(&index[a], &index[b], level, direction));
            }
        }
    }
}

/// Orders by `level` first, then by the remaining levels in order.
fn compare_labels(a: &Label, b: &Label, level: usize, direction: SortDirection) -> Ordering {
    let primary = match (a.level(level), b.level(level)) {
        (Some(x), Some(y)) => directed(x, y, direction),
        _ => Ordering::Equal,
    };
    primary.then_with(|| {
        a.levels()
            .iter()
            .zip(b.levels())
            .enumerate()
            .filter(|(idx, _)| *idx != level)
            .map(|(_, (x, y))| directed(x, y, direction))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Compares in `direction`, keeping nulls and NaN last either way.
fn directed(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    match direction {
        SortDirection::Ascending => a.sort_cmp(b),
        SortDirection::Descending => b.sort_cmp(a),
    }
}

/// Row order captured when a dataset is first wrapped.
///
/// Restoring is a reindex by label, so it does not depend on which rows
/// filters currently hide. A repeated label keeps one captured position per
/// occurrence, handed out in row order.
#[derive(Debug, Clone, Default)]
pub struct OriginalOrder {
    positions: HashMap<Label, Vec<usize>>,
}

impl OriginalOrder {
    pub fn capture(dataset: &Dataset) -> Self {
        let mut positions: HashMap<Label, Vec<usize>> = HashMap::with_capacity(dataset.height());
        for (position, label) in dataset.index().iter().enumerate() {
            positions.entry(label.clone()).or_default().push(position);
        }
        Self { positions }
    }

    /// Original position of the first row carrying `label`, if it existed at
    /// capture time.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.positions.get(label).and_then(|found| found.first()).copied()
    }

    /// Stably puts `rows` back into captured order. Labels that did not
    /// exist at capture time go last.
    pub fn restore(&self, dataset: &Dataset, rows: &mut [usize]) {
        let keys = self.keys(dataset);
        rows.sort_by_key(|&row| keys.get(row).copied().unwrap_or(usize::MAX));
    }

    /// Captured position of every row of `dataset`. The n-th row carrying a
    /// label takes that label's n-th captured position.
    fn keys(&self, dataset: &Dataset) -> Vec<usize> {
        let mut seen: HashMap<&Label, usize> = HashMap::new();
        dataset
            .index()
            .iter()
            .map(|label| {
                let occurrence = seen.entry(label).or_insert(0);
                let key = self
                    .positions
                    .get(label)
                    .and_then(|found| found.get(*occurrence))
                    .copied()
                    .unwrap_or(usize::MAX);
                *occurrence += 1;
                key
            })
            .collect()
    }
}
