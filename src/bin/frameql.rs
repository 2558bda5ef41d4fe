//! # frameql CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Interactive prompt with CSV files loaded as tables
//! frameql --load people=people.csv
//!
//! # Store materialized tables in a file instead of memory
//! frameql --store work.db --load people=people.csv
//!
//! # Run an exported script and print its frame outputs
//! frameql run pipeline.json
//!
//! frameql --version
//! frameql --help
//! ```
//!
//! Logging goes to stderr, filtered by `FRAMEQL_LOG` (default `warn`).

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use eyre::{bail, eyre, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use frameql::cli::{print_frame, Repl, Session};
use frameql::config::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use frameql::export::Script;
use frameql::persist::PinValue;
use frameql::query::EngineBuilder;

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("run") {
        return match &args[1..] {
            [path] => run_script(PathBuf::from(path)),
            _ => bail!("Usage: frameql run <SCRIPT.json>"),
        };
    }

    let mut builder = EngineBuilder::new();
    let mut loads: Vec<(String, PathBuf)> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("frameql {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--load" | "-l" => {
                i += 1;
                let load = args.get(i).ok_or_else(|| eyre!("--load needs NAME=PATH"))?;
                loads.push(parse_load(load)?);
            }
            "--store" | "-s" => {
                i += 1;
                let path = args.get(i).ok_or_else(|| eyre!("--store needs a PATH"))?;
                builder = builder.path(path);
            }
            arg => bail!("Unknown argument: {}", arg),
        }
        i += 1;
    }

    let mut session = Session::new(builder.open()?);
    for (name, path) in &loads {
        let rows = session
            .load_csv(name, path)
            .wrap_err_with(|| format!("failed to load '{}'", path.display()))?;
        info!(table = %name, rows, "table ready");
    }

    let mut repl = Repl::new(session)?;
    repl.run()
}

fn parse_load(arg: &str) -> Result<(String, PathBuf)> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => bail!("--load expects NAME=PATH, got '{}'", arg),
    }
}

fn run_script(path: PathBuf) -> Result<()> {
    let script = Script::load(&path)?;
    let start = Instant::now();
    let vars = script.run(&EngineBuilder::new().config())?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "script done");

    for (name, value) in &vars {
        match value {
            PinValue::Frame(frame) => {
                println!("{}:", name);
                print_frame(frame);
            }
            PinValue::Frames(frames) => {
                for (n, frame) in frames.iter().enumerate() {
                    println!("{}[{}]:", name, n);
                    print_frame(frame);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn print_usage() {
    println!("frameql - SQL over in-memory data frames");
    println!();
    println!("USAGE:");
    println!("    frameql [OPTIONS]");
    println!("    frameql run <SCRIPT.json>");
    println!();
    println!("OPTIONS:");
    println!("    -l, --load NAME=PATH   Load the CSV file at PATH as table NAME (repeatable)");
    println!("    -s, --store PATH       Keep materialized tables in a SQLite file");
    println!("    -h, --help             Print help information");
    println!("    -v, --version          Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    FRAMEQL_LOG            tracing filter, default 'warn'");
    println!("    FRAMEQL_HISTORY        history file, empty to disable");
}
