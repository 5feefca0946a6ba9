//! CLI argument definitions for the frameview viewer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "frameview",
    version,
    about = "Inspect tabular data: filter, sort, edit and summarize CSV datasets",
    long_about = "Inspect tabular data from CSV files.\n\n\
                  Filters use a small expression language (`age > 30 and city == 'Oslo'`).\n\
                  Sorting cycles ascending, descending and original order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// When to colour tables and log output.
    #[command(flatten)]
    pub color: Color,

    /// Log level; takes precedence over -v/-q and RUST_LOG.
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log line format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Viewer and ingest settings (TOML).
    #[arg(long = "config", value_name = "TOML", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a dataset after applying filters and a sort.
    Show(ShowArgs),

    /// Print per-column summary statistics.
    Stats(SourceArgs),

    /// Run console commands from a file against a dataset.
    Script(ScriptArgs),

    /// Read console commands from standard input.
    Repl(SourceArgs),
}

/// Where datasets come from and how they are read.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// CSV file, or a directory whose CSV files are all loaded.
    #[arg(value_name = "CSV")]
    pub path: PathBuf,

    /// Field delimiter.
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Column to use as the row index (repeat for a multi-level index).
    #[arg(long = "index-col", value_name = "COLUMN")]
    pub index_columns: Vec<String>,

    /// Number of header rows forming multi-level column labels.
    #[arg(long = "header-rows", value_name = "N")]
    pub header_rows: Option<usize>,

    /// Reject cell edits.
    #[arg(long = "read-only")]
    pub read_only: bool,

    /// Maximum rows printed per table.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Filter expression (repeat to chain filters).
    #[arg(long = "filter", short = 'f', value_name = "EXPR")]
    pub filters: Vec<String>,

    /// Sort by a column (name or #position).
    #[arg(long = "sort", value_name = "COLUMN", conflicts_with = "sort_index")]
    pub sort: Option<String>,

    /// Sort by an index level (name or #position).
    #[arg(long = "sort-index", value_name = "LEVEL")]
    pub sort_index: Option<String>,

    /// Sort descending instead of ascending.
    #[arg(long = "descending")]
    pub descending: bool,

    /// Also print the statistics table.
    #[arg(long = "stats")]
    pub stats: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// File with one console command per line (`#` starts a comment).
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
