//! Registry of view projections that refresh after every dataset mutation.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::dataset::TabularDataset;

/// A presentation-layer consumer of a [`TabularDataset`].
///
/// `refresh` must drop any cached render state and re-read `dataset`.
pub trait ViewObserver {
    fn refresh(&self, dataset: &TabularDataset);
}

/// Handle returned by [`ViewObserverRegistry::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Non-owning set of observers for one dataset.
///
/// Observers are held weakly: dropping a view without detaching it is safe,
/// it is simply skipped and pruned on the next attach or detach.
#[derive(Default)]
pub struct ViewObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Weak<dyn ViewObserver>)>,
}

impl ViewObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<O: ViewObserver + 'static>(&mut self, observer: &Rc<O>) -> ObserverId {
        self.prune();
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        let weak: Weak<O> = Rc::downgrade(observer);
        let weak: Weak<dyn ViewObserver> = weak;
        self.observers.push((id, weak));
        id
    }

    /// Removes an observer. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: ObserverId) -> bool {
        self.prune();
        let before = self.observers.len();
        self.observers.retain(|(current, _)| *current != id);
        self.observers.len() != before
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers
            .iter()
            .any(|(current, weak)| *current == id && weak.strong_count() > 0)
    }

    /// Number of observers still alive.
    pub fn len(&self) -> usize {
        self.observers
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refreshes every live observer once, in attach order. Returns how many
    /// were refreshed.
    pub fn notify(&self, dataset: &TabularDataset) -> usize {
        let mut refreshed = 0;
        for (_, weak) in &self.observers {
            if let Some(observer) = weak.upgrade() {
                observer.refresh(dataset);
                refreshed += 1;
            }
        }
        refreshed
    }

    fn prune(&mut self) {
        self.observers.retain(|(_, weak)| weak.strong_count() > 0);
    }
}

impl fmt::Debug for ViewObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}
