//! cellgrid - evaluate a text grid of cells and formulas and print it as a table

mod config;

use anyhow::{Context, Result};
use cellgrid_core::{parse_grid, render_table, write_table};
use cellgrid_engine::builtins::{ArgKind, BUILTINS};
use clap::Parser;
use log::info;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cellgrid",
    version,
    about = "Evaluate a grid of cells and formulas and print it as an aligned table."
)]
struct Args {
    /// Grid file: one row per line, cells separated by `|`.
    #[arg(required_unless_present = "functions")]
    input: Option<PathBuf>,

    /// Write the table here instead of stdout.
    output: Option<PathBuf>,

    /// Config file (default: config.toml in the user config dir).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decimal places for non-integer numbers.
    #[arg(short, long, value_name = "N")]
    precision: Option<usize>,

    /// Longest chain of formula dependencies before evaluation gives up.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// List the built-in functions and exit.
    #[arg(long)]
    functions: bool,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.functions {
        print_functions();
        return Ok(());
    }
    let input = args.input.context("No input file given")?;

    let (file_config, warnings) = config::load_config(args.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    let config = file_config.with_overrides(args.precision, args.max_depth);

    let mut table =
        parse_grid(&input).with_context(|| format!("Failed to load {}", input.display()))?;
    table.evaluate_with_max_depth(config.max_depth);
    info!(
        "evaluated {} x {} table from {}",
        table.rows(),
        table.columns(),
        input.display()
    );

    match args.output {
        Some(path) => write_table(&path, &table, config.precision)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(render_table(&table, config.precision).as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn print_functions() {
    for builtin in BUILTINS {
        let args: Vec<&str> = builtin
            .args
            .iter()
            .map(|kind| match kind {
                ArgKind::Scalar => "value",
                ArgKind::Range => "range",
            })
            .collect();
        let signature = format!("{}({})", builtin.name, args.join(", "));
        println!("{:<14}{}", signature, builtin.description);
    }
}
