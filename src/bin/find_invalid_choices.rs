/*
cargo run --bin find_invalid_choices

cargo run --bin find_invalid_choices -- \
    --allowed A,B,C,D \
    --consistency-field doc.instruction \
    --output analysis/invalid_choices.json
*/

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use eval_inspect::config::{InputArgs, LogArgs, RunConfig};
use eval_inspect::logging::init_logging;
use eval_inspect::report::{render_consistency, render_violations, write_json, ValidationReport};
use eval_inspect::{analyze, validate_membership, AllowedSet, FieldPath};

// members listed per unique value in the consistency check
const CONSISTENCY_SHOW: usize = 10;

/// Find documents whose choices fall outside the allowed labels and check
/// that a second field is identical across rows.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Dot-separated path to the list of choice labels
    #[arg(long, default_value = "doc.choices")]
    field: FieldPath,

    /// Allowed labels, compared after trimming and upper-casing
    #[arg(long, value_delimiter = ',', default_value = "A,B,C,D,E")]
    allowed: Vec<String>,

    /// Field that should hold one value across all rows
    #[arg(long = "consistency-field", default_value = "doc.fewshot_samples")]
    consistency_field: FieldPath,

    /// Also write the violating rows as JSON
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("find_invalid_choices", &cli.log)?;

    let cfg = RunConfig::new(cli.input.path, cli.field).with_output(cli.output);
    let records = cfg
        .load()
        .with_context(|| format!("loading {}", cfg.input.display()))?;

    let allowed = AllowedSet::new(&cli.allowed);
    let validation = validate_membership(&records, &cfg.field, &allowed);
    if validation.violating() > 0 {
        warn!("{} rows carry labels outside {:?}", validation.violating(), allowed.labels());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_violations(&mut out, &allowed, &validation)?;

    let consistency = analyze(&records, &cli.consistency_field);
    info!("{}: {} unique values", cli.consistency_field, consistency.unique());
    render_consistency(&mut out, &cli.consistency_field, &consistency, CONSISTENCY_SHOW)?;

    if let Some(path) = &cfg.output {
        write_json(path, &ValidationReport::new(&cfg.field, &allowed, &validation))
            .with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "\nViolations written to: {}", path.display())?;
    }
    Ok(())
}
