//! Tabular state engine for the frameview viewer.
//!
//! A [`TabularDataset`] owns an unfiltered [`Dataset`](frameview_model::Dataset)
//! and derives the visible rows from it:
//!
//! - **filter**: ordered, toggleable predicates; a failing predicate is marked
//!   and skipped instead of aborting the pipeline
//! - **sort**: three-phase cycle per column or index level, restoring the
//!   captured original order on the third step
//! - **observer**: weakly held views refreshed once per successful mutation
//! - **projection**: string caches for grids, headers and filter lists
//! - **query**: the predicate language used by filters
//! - **stats**: per-column summaries computed with polars
//! - **store**: named datasets sharing viewer settings

pub mod dataset;
pub mod error;
pub mod filter;
pub mod observer;
pub mod projection;
pub mod query;
pub mod sort;
pub mod stats;
pub mod store;
pub mod view;

pub use dataset::TabularDataset;
pub use error::{EngineError, Result};
pub use filter::{FilterExpression, FilterPipeline};
pub use observer::{ObserverId, ViewObserver, ViewObserverRegistry};
pub use projection::{
    ColumnHeaderNamesProjection, ColumnHeaderProjection, FilterListProjection, GridProjection,
    IndexHeaderNamesProjection, IndexHeaderProjection, ProjectionSet,
};
pub use query::{Predicate, QueryError};
pub use sort::{OriginalOrder, SortDirection, SortState, SortTarget};
pub use stats::{ColumnStats, STATS_HEADER, describe};
pub use store::Store;
pub use view::View;
