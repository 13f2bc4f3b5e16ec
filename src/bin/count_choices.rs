/*
cargo run --bin count_choices

cargo run --bin count_choices -- --path analysis/rows.ndjson --field doc.choices
*/

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eval_inspect::config::{InputArgs, LogArgs, RunConfig};
use eval_inspect::distribution::length_distribution;
use eval_inspect::logging::init_logging;
use eval_inspect::report::render_distribution;
use eval_inspect::FieldPath;

/// Count how many choices each document has and summarise the distribution.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Dot-separated path to the list being counted
    #[arg(long, default_value = "doc.choices")]
    field: FieldPath,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("count_choices", &cli.log)?;

    let cfg = RunConfig::new(cli.input.path, cli.field);
    let records = cfg
        .load()
        .with_context(|| format!("loading {}", cfg.input.display()))?;

    let dist = length_distribution(&records, &cfg.field);
    info!("mode for {}: {:?}", cfg.field, dist.mode());

    render_distribution(&mut io::stdout().lock(), &dist)?;
    Ok(())
}
