//! Line-oriented console driving a [`Store`] through the same mutation
//! operations a table widget would use.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use clap::ColorChoice;
use frameview_engine::{ProjectionSet, SortState, Store, TabularDataset};
use frameview_model::{Column, Value};
use tracing::{debug, warn};

use crate::render::{render_list, render_stats, render_view};

pub const HELP: &str = "\
commands:
  show [N]                     print the current view (at most N rows)
  stats                        per-column statistics of the current view
  filters                      list filters
  filter add EXPR              append a filter
  filter edit I EXPR           replace the text of filter I
  filter toggle I              enable or disable filter I
  filter remove I              remove filter I
  sort COLUMN                  cycle ascending, descending, original order
  sort-index LEVEL             same, for an index level
  edit ROW COLUMN VALUE        set a cell; ROW counts visible rows
  use NAME                     switch dataset
  datasets                     list datasets
  dump                         print the session state as JSON
  help                         show this text
  quit                         leave the console
columns and levels are names (`quoted` when they contain spaces) or #positions";

/// A column or index level reference: `#2` or a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Position(usize),
    Name(String),
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("missing column or level");
        }
        if let Some(position) = raw.strip_prefix('#') {
            let position = position
                .parse()
                .with_context(|| format!("invalid position '{raw}'"))?;
            return Ok(Self::Position(position));
        }
        Ok(Self::Name(unquote(raw).to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show { rows: Option<usize> },
    Stats,
    Filters,
    FilterAdd(String),
    FilterEdit { index: usize, text: String },
    FilterToggle(usize),
    FilterRemove(usize),
    Sort(Target),
    SortIndex(Target),
    Edit { row: usize, column: Target, value: String },
    Use(String),
    Datasets,
    Dump,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses one console line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = split_word(line);
        let command = match word {
            "show" => Self::Show {
                rows: optional_number(rest)?,
            },
            "stats" => Self::Stats,
            "filters" => Self::Filters,
            "filter" => parse_filter(rest)?,
            "sort" => Self::Sort(Target::parse(rest)?),
            "sort-index" => Self::SortIndex(Target::parse(rest)?),
            "edit" => {
                let (row, rest) = split_word(rest);
                let (column, value) = split_column(rest)?;
                Self::Edit {
                    row: number(row)?,
                    column: Target::parse(column)?,
                    value: value.to_string(),
                }
            }
            "use" => Self::Use(required(rest, "dataset name")?.to_string()),
            "datasets" => Self::Datasets,
            "dump" => Self::Dump,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command '{other}' (try `help`)"),
        };
        Ok(Some(command))
    }
}

fn parse_filter(rest: &str) -> Result<ConsoleCommand> {
    let (action, rest) = split_word(rest);
    Ok(match action {
        "add" => ConsoleCommand::FilterAdd(required(rest, "filter expression")?.to_string()),
        "edit" => {
            let (index, text) = split_word(rest);
            ConsoleCommand::FilterEdit {
                index: number(index)?,
                text: required(text, "filter expression")?.to_string(),
            }
        }
        "toggle" => ConsoleCommand::FilterToggle(number(rest)?),
        "remove" | "rm" => ConsoleCommand::FilterRemove(number(rest)?),
        "" => bail!("missing filter action (add, edit, toggle, remove)"),
        other => bail!("unknown filter action '{other}'"),
    })
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Splits off a column reference, which may be backtick-quoted.
fn split_column(text: &str) -> Result<(&str, &str)> {
    let text = text.trim_start();
    if let Some(quoted) = text.strip_prefix('`') {
        let end = quoted
            .find('`')
            .ok_or_else(|| anyhow!("unterminated column name"))?;
        return Ok((&text[..end + 2], quoted[end + 1..].trim_start()));
    }
    Ok(split_word(text))
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('`')
        .and_then(|inner| inner.strip_suffix('`'))
        .unwrap_or(raw)
}

fn required<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        bail!("missing {what}");
    }
    Ok(text)
}

fn number(text: &str) -> Result<usize> {
    let text = required(text, "number")?;
    text.parse()
        .with_context(|| format!("expected a number, got '{text}'"))
}

fn optional_number(text: &str) -> Result<Option<usize>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        number(text).map(Some)
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Quit,
}

/// Console session over a store. Keeps one set of views attached to the
/// current dataset.
pub struct Console {
    store: Store,
    current: Option<String>,
    views: Option<ProjectionSet>,
    color: ColorChoice,
}

impl Console {
    /// Opens a session on the first dataset of `store`, if any.
    pub fn new(store: Store, color: ColorChoice) -> Self {
        let first = store.names().first().map(|name| (*name).to_string());
        let mut console = Self {
            store,
            current: None,
            views: None,
            color,
        };
        if let Some(name) = first
            && let Err(error) = console.select(&name)
        {
            warn!(dataset = %name, error = %error, "could not open dataset view");
        }
        console
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Parses and executes one line.
    pub fn run_line(&mut self, line: &str) -> Result<Outcome> {
        match ConsoleCommand::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Outcome::Output(String::new())),
        }
    }

    /// Executes every line of `input`, writing results to `out`.
    ///
    /// With `stop_on_error` the first failing line aborts the run; otherwise
    /// errors are printed and the next line is read.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut out: W,
        stop_on_error: bool,
    ) -> Result<()> {
        for (number, line) in input.lines().enumerate() {
            let line = line.context("read console input")?;
            match self.run_line(&line) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Output(text)) => {
                    if !text.is_empty() {
                        writeln!(out, "{text}")?;
                    }
                }
                Err(error) if stop_on_error => {
                    return Err(error.context(format!("line {}: {}", number + 1, line.trim())));
                }
                Err(error) => writeln!(out, "error: {error:#}")?,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn execute(&mut self, command: ConsoleCommand) -> Result<Outcome> {
        debug!(?command, "console command");
        let output = match command {
            ConsoleCommand::Quit => return Ok(Outcome::Quit),
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Datasets => {
                let names = self.store.names();
                render_list("Datasets", &names, self.color)
            }
            ConsoleCommand::Dump => self.store.to_json()?,
            ConsoleCommand::Use(name) => {
                self.select(&name)?;
                format!("using {name}")
            }
            ConsoleCommand::Show { rows } => self.show(rows)?,
            ConsoleCommand::Stats => render_stats(&self.dataset()?.statistics()?, self.color),
            ConsoleCommand::Filters => {
                let views = self.views()?;
                let entries = views.filter_list.entries();
                if entries.is_empty() {
                    "no filters".to_string()
                } else {
                    entries
                        .iter()
                        .enumerate()
                        .map(|(position, entry)| format!("{position}: {entry}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ConsoleCommand::FilterAdd(text) => {
                let dataset = self.dataset_mut()?;
                dataset.add_filter(text);
                filter_report(dataset, dataset.filters().len() - 1, "added")
            }
            ConsoleCommand::FilterEdit { index, text } => {
                let dataset = self.dataset_mut()?;
                dataset.edit_filter(index, text)?;
                filter_report(dataset, index, "edited")
            }
            ConsoleCommand::FilterToggle(index) => {
                let dataset = self.dataset_mut()?;
                let enabled = dataset.toggle_filter(index)?;
                let state = if enabled { "enabled" } else { "disabled" };
                filter_report(dataset, index, state)
            }
            ConsoleCommand::FilterRemove(index) => {
                let dataset = self.dataset_mut()?;
                let removed = dataset.remove_filter(index)?;
                format!(
                    "filter {index} removed: {} ({})",
                    removed.text(),
                    row_counts(dataset)
                )
            }
            ConsoleCommand::Sort(target) => {
                let dataset = self.dataset_mut()?;
                let position = resolve_column(dataset, &target)?;
                let state = dataset.sort_by(position, false)?;
                sort_report(dataset, state)
            }
            ConsoleCommand::SortIndex(target) => {
                let dataset = self.dataset_mut()?;
                let level = resolve_level(dataset, &target)?;
                let state = dataset.sort_by(level, true)?;
                sort_report(dataset, state)
            }
            ConsoleCommand::Edit { row, column, value } => {
                let dataset = self.dataset_mut()?;
                let col = resolve_column(dataset, &column)?;
                dataset.edit_cell(row, col, Value::parse_literal(&value))?;
                format!("cell updated ({})", row_counts(dataset))
            }
        };
        Ok(Outcome::Output(output))
    }

    fn show(&mut self, rows: Option<usize>) -> Result<String> {
        let max_rows = self.store.settings().max_rows;
        let color = self.color;
        match rows {
            Some(rows) if rows != max_rows => {
                let dataset = self.dataset_mut()?;
                let views = ProjectionSet::attach(dataset, rows);
                let text = render_view(dataset, &views, color);
                views.detach(dataset);
                Ok(text)
            }
            _ => Ok(render_view(self.dataset()?, self.views()?, color)),
        }
    }

    fn select(&mut self, name: &str) -> Result<()> {
        let max_rows = self.store.settings().max_rows;
        let dataset = self.store.get_mut(name)?;
        let views = ProjectionSet::attach(dataset, max_rows);
        if let (Some(previous), Some(old)) = (self.current.take(), self.views.take())
            && let Ok(previous) = self.store.get_mut(&previous)
        {
            old.detach(previous);
        }
        self.current = Some(name.to_string());
        self.views = Some(views);
        Ok(())
    }

    fn dataset(&self) -> Result<&TabularDataset> {
        let name = self.current.as_deref().ok_or_else(no_dataset)?;
        Ok(self.store.get(name)?)
    }

    fn dataset_mut(&mut self) -> Result<&mut TabularDataset> {
        let name = self.current.as_deref().ok_or_else(no_dataset)?;
        Ok(self.store.get_mut(name)?)
    }

    fn views(&self) -> Result<&ProjectionSet> {
        self.views.as_ref().ok_or_else(no_dataset)
    }
}

fn no_dataset() -> anyhow::Error {
    anyhow!("no dataset selected (try `datasets` and `use NAME`)")
}

fn resolve_column(dataset: &TabularDataset, target: &Target) -> Result<usize> {
    match target {
        Target::Position(position) => Ok(*position),
        Target::Name(name) => dataset
            .unfiltered()
            .column_position(name)
            .ok_or_else(|| anyhow!("no column named '{name}'")),
    }
}

fn resolve_level(dataset: &TabularDataset, target: &Target) -> Result<usize> {
    match target {
        Target::Position(position) => Ok(*position),
        Target::Name(name) if name == "index" => Ok(0),
        Target::Name(name) => dataset
            .unfiltered()
            .index_level_position(name)
            .ok_or_else(|| anyhow!("no index level named '{name}'")),
    }
}

fn row_counts(dataset: &TabularDataset) -> String {
    format!(
        "{} of {} rows",
        dataset.current_view().height(),
        dataset.unfiltered().height()
    )
}

fn filter_report(dataset: &TabularDataset, index: usize, action: &str) -> String {
    let failed = dataset
        .filters()
        .get(index)
        .is_some_and(|filter| filter.has_failed());
    let note = if failed { ", failed and skipped" } else { "" };
    format!("filter {index} {action}{note} ({})", row_counts(dataset))
}

fn sort_report(dataset: &TabularDataset, state: SortState) -> String {
    let data = dataset.unfiltered();
    let description = if let Some((col, direction)) = state.column() {
        let name = data.column(col).map(Column::name).unwrap_or_default();
        format!("sorted by {name} {}", direction.arrow())
    } else if let Some((level, direction)) = state.index_level() {
        let name = data
            .index_names()
            .get(level)
            .cloned()
            .flatten()
            .unwrap_or_else(|| format!("level {level}"));
        format!("sorted by index {name} {}", direction.arrow())
    } else {
        "original order restored".to_string()
    };
    format!("{description} ({})", row_counts(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_commands() {
        assert_eq!(
            ConsoleCommand::parse("filter add age > 30").unwrap(),
            Some(ConsoleCommand::FilterAdd("age > 30".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("filter edit 2  city == 'Oslo'").unwrap(),
            Some(ConsoleCommand::FilterEdit {
                index: 2,
                text: "city == 'Oslo'".to_string()
            })
        );
        assert_eq!(
            ConsoleCommand::parse("filter rm 0").unwrap(),
            Some(ConsoleCommand::FilterRemove(0))
        );
        assert!(ConsoleCommand::parse("filter add").is_err());
        assert!(ConsoleCommand::parse("filter toggle x").is_err());
    }

    #[test]
    fn parses_targets() {
        assert_eq!(
            ConsoleCommand::parse("sort #1").unwrap(),
            Some(ConsoleCommand::Sort(Target::Position(1)))
        );
        assert_eq!(
            ConsoleCommand::parse("sort `first name`").unwrap(),
            Some(ConsoleCommand::Sort(Target::Name("first name".to_string())))
        );
        assert_eq!(
            ConsoleCommand::parse("sort-index key").unwrap(),
            Some(ConsoleCommand::SortIndex(Target::Name("key".to_string())))
        );
    }

    #[test]
    fn parses_edit_with_quoted_column() {
        assert_eq!(
            ConsoleCommand::parse("edit 3 `first name` Ann Marie").unwrap(),
            Some(ConsoleCommand::Edit {
                row: 3,
                column: Target::Name("first name".to_string()),
                value: "Ann Marie".to_string()
            })
        );
        assert_eq!(
            ConsoleCommand::parse("edit 0 age").unwrap(),
            Some(ConsoleCommand::Edit {
                row: 0,
                column: Target::Name("age".to_string()),
                value: String::new()
            })
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
        assert_eq!(ConsoleCommand::parse("# note").unwrap(), None);
        assert!(ConsoleCommand::parse("frobnicate").is_err());
    }
}
