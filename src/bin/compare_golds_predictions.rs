/*
cargo run --bin compare_golds_predictions

cargo run --bin compare_golds_predictions -- \
    --json-input analysis/answers/golds_predictions.json \
    --show 25
*/

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eval_inspect::compare::compare_pairs;
use eval_inspect::config::{LogArgs, DEFAULT_ANSWERS_DIR};
use eval_inspect::export::GOLDS_PREDICTIONS_FILE;
use eval_inspect::logging::init_logging;
use eval_inspect::report::render_comparison;
use eval_inspect::source::read_json_array;

/// Compute match stats between extracted golds and predictions.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON list written by export_answers (default: analysis/answers/golds_predictions.json)
    #[arg(long = "json-input", value_name = "PATH")]
    json_input: Option<PathBuf>,

    /// Mismatches to print
    #[arg(long, default_value_t = 10)]
    show: usize,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("compare_golds_predictions", &cli.log)?;

    let src = cli
        .json_input
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANSWERS_DIR).join(GOLDS_PREDICTIONS_FILE));
    let records = read_json_array(&src).with_context(|| format!("loading {}", src.display()))?;

    let cmp = compare_pairs(&records);
    info!("accuracy {:.4} over {} pairs", cmp.accuracy(), cmp.total);

    render_comparison(&mut io::stdout().lock(), &cmp, cli.show)?;
    Ok(())
}
