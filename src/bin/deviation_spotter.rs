/*
cargo run --bin deviation_spotter -- doc.fewshot_samples

cargo run --bin deviation_spotter -- \
    model_response.text \
    --path details_community_lexam-en-idk_0_2025-11-18T18-17-53.491808.parquet \
    --show 10 \
    --output analysis/deviations/model_response_text.json
*/

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eval_inspect::config::{InputArgs, LogArgs, RunConfig, DEFAULT_SHOW};
use eval_inspect::logging::init_logging;
use eval_inspect::report::{render_deviations, write_json, AnalysisReport};
use eval_inspect::{analyze, FieldPath};

/// Check if a specific field differs across rows and list deviations.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Dot-separated path to the field (e.g. doc.fewshot_samples or model_response.text)
    field: FieldPath,

    #[command(flatten)]
    input: InputArgs,

    /// How many sample row numbers to show per unique value
    #[arg(long, default_value_t = DEFAULT_SHOW)]
    show: usize,

    /// Also write the full bucket report as JSON
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("deviation_spotter", &cli.log)?;

    let cfg = RunConfig::new(cli.input.path, cli.field)
        .with_show(cli.show)
        .with_output(cli.output);

    let records = cfg
        .load()
        .with_context(|| format!("loading {}", cfg.input.display()))?;
    let result = analyze(&records, &cfg.field);
    info!("{}: {} unique values over {} rows", cfg.field, result.unique(), result.total);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_deviations(&mut out, &cfg.field, &result, cfg.show)?;

    if let Some(path) = &cfg.output {
        write_json(path, &AnalysisReport::new(&cfg.field, &result))
            .with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "\nReport written to: {}", path.display())?;
    }
    Ok(())
}
