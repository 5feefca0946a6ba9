//! Settings shared by every dataset in a store.

use serde::{Deserialize, Serialize};

/// Default number of rows rendered by table views.
pub const DEFAULT_MAX_ROWS: usize = 50;

/// Options controlling how datasets may be edited and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether table cells are editable.
    pub editable: bool,

    /// Keep the console attached after the first render instead of returning.
    pub block: bool,

    /// Maximum rows shown when rendering a view.
    pub max_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            editable: true,
            block: false,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}
