// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use logging::LogConfig;
use roster_app::{AppState, EditCursor, RecordStore, render_table};
use roster_db::Store;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    match options.print {
        Some(PrintTarget::ConfigPath) => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        Some(PrintTarget::ExampleConfig) => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        Some(PrintTarget::DbPath | PrintTarget::Html) | None => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roster --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print == Some(PrintTarget::DbPath) {
        println!("{}", db_path.display());
        return Ok(());
    }

    logging::init_logging(&LogConfig {
        level: config.log_level(),
        log_file: config.log_file()?,
    })?;

    let mut store = if options.demo {
        let mut store = Store::open_memory()?;
        store.seed_demo_data()?;
        store
    } else {
        Store::open_with_key(&db_path, config.slot_key()).with_context(|| {
            format!(
                "open database {} -- if this path is wrong, set [storage].db_path or ROSTER_DB_PATH",
                db_path.display()
            )
        })?
    };
    info!(
        db_path = %db_path.display(),
        slot_key = store.slot().key(),
        records = store.len(),
        "store opened"
    );

    if options.print == Some(PrintTarget::Html) {
        print!("{}", render_table(store.records(), EditCursor::None).to_html());
        return Ok(());
    }
    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::default();
    roster_tui::run_app(&mut state, &mut store)
}

/// What a `--print-*` flag writes to stdout instead of starting the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrintTarget {
    ConfigPath,
    DbPath,
    ExampleConfig,
    Html,
}

impl PrintTarget {
    fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "--print-config-path" => Some(Self::ConfigPath),
            "--print-path" => Some(Self::DbPath),
            "--print-example-config" => Some(Self::ExampleConfig),
            "--print-html" => Some(Self::Html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print: Option<PrintTarget>,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print: None,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();
        if let Some(target) = PrintTarget::from_flag(arg) {
            if options.print.is_some_and(|existing| existing != target) {
                bail!("{arg} conflicts with an earlier --print-* flag; pass only one");
            }
            options.print = Some(target);
            continue;
        }
        match arg {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options")
            }
        }
    }

    if options.check_only && options.print.is_some() {
        bail!("--check cannot be combined with a --print-* flag");
    }
    Ok(options)
}

fn print_help() {
    println!("roster: student records in the terminal");
    println!();
    println!("usage: roster [--config <path>] [--demo] [--check | --print-<target>]");
    println!("  --config <path>          Read config from <path> instead of the default");
    println!("  --demo                   Use an in-memory database seeded with sample students");
    println!("  --check                  Load config and open the database, then exit");
    println!("  --print-config-path      Print the resolved config path");
    println!("  --print-path             Print the resolved database path");
    println!("  --print-example-config   Print a commented v1 config template");
    println!("  --print-html             Print the saved records as HTML <tbody> markup");
    println!("  -h, --help               Show this help");
}
