//! TOML configuration: viewer settings and CSV ingest options.
//!
//! ```toml
//! [viewer]
//! editable = false
//! max_rows = 20
//!
//! [ingest]
//! delimiter = ";"
//! index_columns = ["id"]
//! ```
//!
//! Command-line flags override file values. The file is never written.

use std::path::Path;

use anyhow::{Context, Result};
use frameview_ingest::IngestOptions;
use frameview_model::Settings;
use serde::Deserialize;

use crate::cli::SourceArgs;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub viewer: Settings,
    pub ingest: IngestOptions,
}

impl AppConfig {
    /// Loads the file at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_source_args(mut self, args: &SourceArgs) -> Self {
        if let Some(delimiter) = args.delimiter {
            self.ingest.delimiter = delimiter;
        }
        if !args.index_columns.is_empty() {
            self.ingest.index_columns = args.index_columns.clone();
        }
        if let Some(header_rows) = args.header_rows {
            self.ingest.header_rows = header_rows;
        }
        if args.read_only {
            self.viewer.editable = false;
        }
        if let Some(max_rows) = args.max_rows {
            self.viewer.max_rows = max_rows;
        }
        self
    }
}
