//! CLI argument definitions for `hstat`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use hstat_ingest::DEFAULT_BATCH_SIZE;
use hstat_query::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

#[derive(Parser)]
#[command(
    name = "hstat",
    version,
    about = "Health-statistics record pipeline",
    long_about = "Normalize and enrich health-statistics tables with rule files,\n\
                  then filter them or list their distinct values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a dataset through a transformer chain.
    Transform(TransformArgs),

    /// Print a rule file as a table.
    Rules(RulesArgs),

    /// Filter a dataset and print matching records.
    Search(SearchArgs),

    /// List distinct value combinations of one or more fields.
    Terms(TermsArgs),
}

#[derive(Args)]
pub struct TransformArgs {
    /// Dataset CSV to transform.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Directory holding `<name>.csv` rule files.
    #[arg(long = "rules-dir", value_name = "DIR")]
    pub rules_dir: PathBuf,

    /// Transformer to apply, in order. Repeatable.
    ///
    /// Defaults to the `transformers` list of the dataset's
    /// `<stem>.meta.json` sidecar.
    #[arg(long = "transformer", value_name = "NAME")]
    pub transformers: Vec<String>,

    /// Output CSV (default: `<stem>.transformed.csv` next to the input).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Where unmatched-key reports go (default: the output's directory).
    #[arg(long = "reports-dir", value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Rule CSV to print.
    #[arg(value_name = "RULE_CSV")]
    pub path: PathBuf,
}

/// Filter sources shared by `search` and `terms`.
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Filter as JSON, e.g. '{"terms": {"source": ["NFHS-4", null]}}'.
    #[arg(long = "filter", value_name = "JSON", conflicts_with = "filter_file")]
    pub filter: Option<String>,

    /// Read the filter JSON from a file.
    #[arg(long = "filter-file", value_name = "PATH")]
    pub filter_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Dataset CSV to search.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Allow a search without any filter.
    #[arg(long = "all")]
    pub all: bool,

    /// Print the compiled query before the results.
    #[arg(long = "explain")]
    pub explain: bool,

    /// Maximum number of records to print.
    #[arg(long = "limit", default_value_t = 20)]
    pub limit: usize,

    /// Records indexed per batch.
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

#[derive(Args)]
pub struct TermsArgs {
    /// Dataset CSV to enumerate.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Field to group by. Repeatable; order sets the sort priority.
    #[arg(long = "field", value_name = "FIELD", required = true)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Buckets requested per page.
    #[arg(long = "page-size", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Pages requested before giving up.
    #[arg(long = "max-pages", default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Records indexed per batch.
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
