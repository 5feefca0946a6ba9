//! Named collection of datasets sharing one set of viewer settings.

use frameview_model::{Column, Dataset, Settings};
use serde::Serialize;
use tracing::info;

use crate::dataset::TabularDataset;
use crate::error::{EngineError, Result};
use crate::filter::FilterExpression;
use crate::sort::SortState;

const DEFAULT_NAME: &str = "Untitled";

/// Datasets open in one viewer session, in insertion order.
#[derive(Debug, Default)]
pub struct Store {
    settings: Settings,
    datasets: Vec<TabularDataset>,
}

impl Store {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            datasets: Vec::new(),
        }
    }

    /// Name given to datasets added without one.
    pub fn default_name() -> &'static str {
        DEFAULT_NAME
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings. Existing datasets pick up the new `editable` flag.
    pub fn set_settings(&mut self, settings: Settings) {
        for dataset in &mut self.datasets {
            dataset.set_editable(settings.editable);
        }
        self.settings = settings;
    }

    /// Wraps and adds a dataset. Names must be unique within the store.
    pub fn add(&mut self, name: impl Into<String>, dataset: Dataset) -> Result<&mut TabularDataset> {
        let name = name.into();
        if self.contains(&name) {
            return Err(EngineError::DuplicateName { name });
        }
        info!(
            dataset = %name,
            rows = dataset.height(),
            columns = dataset.width(),
            "dataset added"
        );
        let wrapped = TabularDataset::new(name, dataset).with_editable(self.settings.editable);
        self.datasets.push(wrapped);
        let last = self.datasets.len() - 1;
        Ok(&mut self.datasets[last])
    }

    /// Adds a dataset under the default name, suffixed to keep it unique.
    pub fn add_unnamed(&mut self, dataset: Dataset) -> Result<&mut TabularDataset> {
        let name = self.unique_name(DEFAULT_NAME);
        self.add(name, dataset)
    }

    /// Adds an already wrapped dataset, keeping its filters and sort.
    pub fn insert(&mut self, mut dataset: TabularDataset) -> Result<&mut TabularDataset> {
        if dataset.name().is_empty() {
            dataset.rename(self.unique_name(DEFAULT_NAME));
        }
        if self.contains(dataset.name()) {
            return Err(EngineError::DuplicateName {
                name: dataset.name().to_string(),
            });
        }
        dataset.set_editable(self.settings.editable);
        self.datasets.push(dataset);
        let last = self.datasets.len() - 1;
        Ok(&mut self.datasets[last])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.iter().any(|d| d.name() == name)
    }

    pub fn get(&self, name: &str) -> Result<&TabularDataset> {
        self.datasets
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| unknown(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut TabularDataset> {
        self.datasets
            .iter_mut()
            .find(|d| d.name() == name)
            .ok_or_else(|| unknown(name))
    }

    pub fn remove(&mut self, name: &str) -> Result<TabularDataset> {
        let position = self
            .datasets
            .iter()
            .position(|d| d.name() == name)
            .ok_or_else(|| unknown(name))?;
        info!(dataset = %name, "dataset removed");
        Ok(self.datasets.remove(position))
    }

    pub fn names(&self) -> Vec<&str> {
        self.datasets.iter().map(TabularDataset::name).collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabularDataset> {
        self.datasets.iter()
    }

    /// Serializes settings and per-dataset state as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = StoreSnapshot {
            settings: &self.settings,
            datasets: self.datasets.iter().map(DatasetSnapshot::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

fn unknown(name: &str) -> EngineError {
    EngineError::UnknownDataset {
        name: name.to_string(),
    }
}

#[derive(Serialize)]
struct StoreSnapshot<'a> {
    settings: &'a Settings,
    datasets: Vec<DatasetSnapshot<'a>>,
}

#[derive(Serialize)]
struct DatasetSnapshot<'a> {
    name: &'a str,
    rows: usize,
    visible_rows: usize,
    columns: Vec<String>,
    editable: bool,
    filters: &'a [FilterExpression],
    sort: SortState,
}

impl<'a> From<&'a TabularDataset> for DatasetSnapshot<'a> {
    fn from(dataset: &'a TabularDataset) -> Self {
        Self {
            name: dataset.name(),
            rows: dataset.unfiltered().height(),
            visible_rows: dataset.current_view().height(),
            columns: dataset
                .unfiltered()
                .columns()
                .iter()
                .map(Column::name)
                .collect(),
            editable: dataset.is_editable(),
            filters: dataset.filters(),
            sort: dataset.sort_state(),
        }
    }
}
