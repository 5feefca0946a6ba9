//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ColorChoice;
use frameview_engine::Store;
use frameview_ingest::load_datasets;
use tracing::{info, info_span};

use crate::cli::{ScriptArgs, ShowArgs, SourceArgs};
use crate::config::AppConfig;
use crate::console::{Console, ConsoleCommand, Outcome, Target};

/// Loads the datasets named by `source` into a new store.
pub fn open_store(source: &SourceArgs, config_path: Option<&Path>) -> Result<Store> {
    let config = AppConfig::load(config_path)?.with_source_args(source);
    let span = info_span!("open", path = %source.path.display());
    let _guard = span.enter();

    let datasets = load_datasets(&source.path, &config.ingest)
        .with_context(|| format!("load datasets: {}", source.path.display()))?;
    if datasets.is_empty() {
        bail!("no CSV files found in {}", source.path.display());
    }

    let mut store = Store::new(config.viewer);
    for (name, dataset) in datasets {
        if name.is_empty() {
            store.add_unnamed(dataset)?;
        } else {
            store.add(name, dataset)?;
        }
    }
    info!(datasets = store.len(), "store ready");
    Ok(store)
}

/// Prints the first dataset after the requested filters and sort. With
/// `block` set in the viewer settings the console then reads stdin.
pub fn run_show<W: Write>(
    args: &ShowArgs,
    config_path: Option<&Path>,
    color: ColorChoice,
    mut out: W,
) -> Result<()> {
    let store = open_store(&args.source, config_path)?;
    let block = store.settings().block;
    let mut console = Console::new(store, color);

    let mut commands: Vec<ConsoleCommand> = args
        .filters
        .iter()
        .map(|text| ConsoleCommand::FilterAdd(text.clone()))
        .collect();
    let sort = match (&args.sort, &args.sort_index) {
        (Some(column), _) => Some(ConsoleCommand::Sort(Target::parse(column)?)),
        (None, Some(level)) => Some(ConsoleCommand::SortIndex(Target::parse(level)?)),
        (None, None) => None,
    };
    if let Some(sort) = sort {
        let clicks = if args.descending { 2 } else { 1 };
        commands.extend(std::iter::repeat_n(sort, clicks));
    }
    for command in commands {
        console.execute(command)?;
    }

    write_outcome(&mut out, console.execute(ConsoleCommand::Show { rows: None })?)?;
    if args.stats {
        write_outcome(&mut out, console.execute(ConsoleCommand::Stats)?)?;
    }
    if block {
        console.run(io::stdin().lock(), &mut out, false)?;
    }
    Ok(())
}

/// Prints statistics for every loaded dataset.
pub fn run_stats<W: Write>(
    source: &SourceArgs,
    config_path: Option<&Path>,
    color: ColorChoice,
    mut out: W,
) -> Result<()> {
    let store = open_store(source, config_path)?;
    let names: Vec<String> = store.names().into_iter().map(str::to_string).collect();
    let mut console = Console::new(store, color);
    for name in names {
        console.execute(ConsoleCommand::Use(name.clone()))?;
        writeln!(out, "{name}")?;
        write_outcome(&mut out, console.execute(ConsoleCommand::Stats)?)?;
    }
    Ok(())
}

/// Runs a command file, stopping at the first failing line.
pub fn run_script<W: Write>(
    args: &ScriptArgs,
    config_path: Option<&Path>,
    color: ColorChoice,
    out: W,
) -> Result<()> {
    let script = File::open(&args.script)
        .with_context(|| format!("open script: {}", args.script.display()))?;
    let store = open_store(&args.source, config_path)?;
    let mut console = Console::new(store, color);
    console.run(BufReader::new(script), out, true)
}

/// Reads commands from stdin until `quit` or end of input.
pub fn run_repl<W: Write>(
    source: &SourceArgs,
    config_path: Option<&Path>,
    color: ColorChoice,
    out: W,
) -> Result<()> {
    let store = open_store(source, config_path)?;
    let mut console = Console::new(store, color);
    console.run(io::stdin().lock(), out, false)
}

fn write_outcome<W: Write>(out: &mut W, outcome: Outcome) -> Result<()> {
    if let Outcome::Output(text) = outcome
        && !text.is_empty()
    {
        writeln!(out, "{text}")?;
    }
    Ok(())
}
