//! `hs-codes`: Harmonized System code toolkit.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use comfy_table::Table;
use hs_cli::commands::{
    Session, ValidateRequest, run_ancestors, run_children, run_correlate, run_doctor, run_lookup,
    run_search, run_validate, run_versions,
};
use hs_cli::logging::{LogConfig, LogFormat, init_logging};
use hs_cli::summary;
use hs_model::VersionId;
use hs_search::SearchOptions;
use serde::Serialize;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let session = Session::open(cli.data_dir.as_deref())?;
    match &cli.command {
        Command::Validate(args) => {
            let request = ValidateRequest {
                version: args.version.as_deref(),
                jurisdiction: args.jurisdiction.as_deref(),
                check_existence: !args.no_existence,
            };
            let report = run_validate(&session, &args.codes, &request);
            if cli.json {
                print_json(&report)?;
            } else {
                print_table(&summary::validation_table(&report));
                println!("{}", summary::validation_footer(&report));
            }
            return Ok(if report.has_errors() { 1 } else { 0 });
        }
        Command::Lookup(args) => {
            let report = run_lookup(
                &session,
                &args.entry.code,
                args.entry.version.as_deref(),
                args.jurisdiction.as_deref(),
            )?;
            emit(cli.json, &report, summary::lookup_table)?;
        }
        Command::Children(args) => {
            let list = run_children(&session, &args.code, args.version.as_deref())?;
            emit(cli.json, &list, summary::entries_table)?;
        }
        Command::Ancestors(args) => {
            let list = run_ancestors(&session, &args.code, args.version.as_deref())?;
            emit(cli.json, &list, summary::entries_table)?;
        }
        Command::Correlate(args) => {
            let conversions = run_correlate(&session, &args.codes, &args.from, &args.to)?;
            emit(cli.json, &conversions, |c: &Vec<_>| summary::conversion_table(c))?;
        }
        Command::Search(args) => {
            let options = SearchOptions {
                version: args.version.as_deref().map(VersionId::new),
                chapters: args.chapters.clone(),
                limit: args.limit,
                mode: args.mode.into(),
            };
            let report = run_search(&session, &args.query, options)?;
            emit(cli.json, &report, summary::search_table)?;
        }
        Command::Versions => {
            let versions = run_versions(&session);
            emit(cli.json, &versions, |v: &Vec<_>| summary::versions_table(v))?;
        }
        Command::Doctor => {
            let report = run_doctor(&session);
            if cli.json {
                print_json(&report)?;
            } else {
                println!("Dataset: {}", session.data_dir().display());
                print_table(&summary::doctor_table(&report));
                println!("{}", summary::doctor_footer(&report));
            }
        }
    }
    Ok(0)
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl Fn(&T) -> Table) -> Result<()> {
    if json {
        print_json(value)
    } else {
        print_table(&render(value));
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(table: &Table) {
    println!("{table}");
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
