//! CLI argument definitions for `hs-codes`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use hs_search::{DEFAULT_LIMIT, SearchMode};

#[derive(Parser)]
#[command(
    name = "hs-codes",
    version,
    about = "Validate, look up, correlate and search Harmonized System codes",
    long_about = "Validate, look up, correlate and search Harmonized System codes.\n\n\
                  Data is read from a manifest-verified dataset directory\n\
                  (--data-dir, HS_DATA_DIR, or ./data)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Dataset directory containing manifest.toml.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
    /// Validate one or more codes.
    Validate(ValidateArgs),

    /// Show the registry entry for a code.
    Lookup(LookupArgs),

    /// List the entries one level below a chapter or heading.
    Children(EntryArgs),

    /// Show the chapter, heading and subheading above a code.
    Ancestors(EntryArgs),

    /// Project codes from one nomenclature version onto another.
    Correlate(CorrelateArgs),

    /// Search descriptions.
    Search(SearchArgs),

    /// List loaded nomenclature versions.
    Versions,

    /// Verify the dataset manifest and summarize its contents.
    Doctor,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,

    /// Nomenclature version (default: current).
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Check national tariff lines against this jurisdiction.
    #[arg(long, value_name = "CODE")]
    pub jurisdiction: Option<String>,

    /// Check the format only, not registry membership.
    #[arg(long = "no-existence")]
    pub no_existence: bool,
}

#[derive(Args)]
pub struct EntryArgs {
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Nomenclature version (default: current).
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

#[derive(Args)]
pub struct LookupArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Look up a national tariff line in this jurisdiction.
    #[arg(long, value_name = "CODE")]
    pub jurisdiction: Option<String>,
}

#[derive(Args)]
pub struct CorrelateArgs {
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,

    /// Source nomenclature version.
    #[arg(long, value_name = "VERSION")]
    pub from: String,

    /// Target nomenclature version.
    #[arg(long, value_name = "VERSION")]
    pub to: String,
}

#[derive(Args)]
pub struct SearchArgs {
    #[arg(value_name = "QUERY")]
    pub query: String,

    #[arg(long, value_enum, default_value = "exact")]
    pub mode: SearchModeArg,

    /// Restrict results to a chapter (repeatable).
    #[arg(long = "chapter", value_name = "CHAPTER")]
    pub chapters: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Nomenclature version (default: current).
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchModeArg {
    Exact,
    Prefix,
    Fuzzy,
}

impl From<SearchModeArg> for SearchMode {
    fn from(arg: SearchModeArg) -> Self {
        match arg {
            SearchModeArg::Exact => Self::Exact,
            SearchModeArg::Prefix => Self::Prefix,
            SearchModeArg::Fuzzy => Self::Fuzzy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
