/*
cargo run --bin export_answers

cargo run --bin export_answers -- --path rows.parquet --out-dir analysis/answers_run2
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use eval_inspect::config::{InputArgs, LogArgs, DEFAULT_ANSWERS_DIR};
use eval_inspect::export::write_answers;
use eval_inspect::logging::init_logging;
use eval_inspect::source::load_records;

/// Export choices and gold/prediction pairs as JSON lists.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Directory receiving choices.json and golds_predictions.json
    #[arg(long = "out-dir", value_name = "DIR", default_value = DEFAULT_ANSWERS_DIR)]
    out_dir: PathBuf,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("export_answers", &cli.log)?;

    let records = load_records(&cli.input.path)
        .with_context(|| format!("loading {}", cli.input.path.display()))?;
    let written = write_answers(&records, &cli.out_dir)
        .with_context(|| format!("writing into {}", cli.out_dir.display()))?;

    println!("Wrote {} choice entries to {}", written.count, written.choices.display());
    println!(
        "Wrote {} gold/prediction entries to {}",
        written.count,
        written.golds_predictions.display()
    );
    Ok(())
}
