//! Row filters and the ordered pipeline that applies them.

use frameview_model::Dataset;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::query::Predicate;

/// A single filter predicate with its toggle and failure state.
///
/// `failed` is sticky: once evaluation fails the filter is skipped on every
/// later recompute until its text is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    text: String,
    enabled: bool,
    failed: bool,
}

impl FilterExpression {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            enabled: true,
            failed: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Whether the filter takes part in the next evaluation.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.failed
    }
}

/// Ordered filters narrowing a dataset's rows.
///
/// Each active filter is evaluated against the output of the previous one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterPipeline {
    filters: Vec<FilterExpression>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &[FilterExpression] {
        &self.filters
    }

    pub fn get(&self, index: usize) -> Option<&FilterExpression> {
        self.filters.get(index)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Appends an enabled filter.
    pub fn add(&mut self, text: impl Into<String>) {
        self.filters.push(FilterExpression::new(text));
    }

    pub fn remove(&mut self, index: usize) -> Result<FilterExpression> {
        self.check(index)?;
        Ok(self.filters.remove(index))
    }

    /// Replaces the text of a filter and clears its failure flag.
    pub fn edit(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.check(index)?;
        let filter = &mut self.filters[index];
        filter.text = text.into();
        filter.failed = false;
        Ok(())
    }

    /// Flips `enabled` and returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        self.check(index)?;
        let filter = &mut self.filters[index];
        filter.enabled = !filter.enabled;
        Ok(filter.enabled)
    }

    /// Returns the positions of `base` rows that pass every active filter.
    ///
    /// Never fails: a filter that cannot be compiled or evaluated is marked
    /// failed and the rows it received pass through unchanged.
    pub fn apply(&mut self, base: &Dataset) -> Vec<usize> {
        let mut rows: Vec<usize> = (0..base.height()).collect();
        for (index, filter) in self.filters.iter_mut().enumerate() {
            if !filter.is_active() {
                continue;
            }
            let outcome = Predicate::compile(&filter.text, base)
                .and_then(|predicate| predicate.select(base, &rows));
            match outcome {
                Ok(kept) => {
                    debug!(filter = index, before = rows.len(), after = kept.len(), "filter applied");
                    rows = kept;
                }
                Err(error) => {
                    warn!(filter = index, text = %filter.text, %error, "filter failed");
                    filter.failed = true;
                }
            }
        }
        rows
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.filters.len() {
            Ok(())
        } else {
            Err(EngineError::out_of_range("filter", index, self.filters.len()))
        }
    }
}
