/*
cargo run --bin inspect_records -- details.parquet

cargo run --bin inspect_records -- details.parquet \
    --rows 2 \
    --retrieve 17 --retrieve-save analysis/rows \
    --csv analysis/details.csv \
    --json analysis/details.ndjson
*/

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eval_inspect::config::LogArgs;
use eval_inspect::logging::init_logging;
use eval_inspect::report::{render_summary, write_csv, write_ndjson};
use eval_inspect::source::summarize;

/// Show schema, column stats, and a small preview of a records file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Records file to inspect (.parquet, .json, .jsonl or .ndjson)
    path: PathBuf,

    /// Number of rows to preview
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Export the full table as CSV (nested values as JSON strings)
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Export the full table as newline-delimited JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Print a specific row (1-based) as pretty JSON
    #[arg(long, value_name = "N")]
    retrieve: Option<usize>,

    /// Directory to save the retrieved row into as row_<N>.json
    #[arg(long = "retrieve-save", value_name = "DIR", requires = "retrieve")]
    retrieve_save: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("inspect_records", &cli.log)?;

    let summary = summarize(&cli.path).with_context(|| format!("inspecting {}", cli.path.display()))?;
    info!("{}: {} rows, {} columns", cli.path.display(), summary.num_rows(), summary.columns.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_summary(&mut out, &summary, cli.rows)?;

    if let Some(n) = cli.retrieve {
        let row = summary.row(n)?;
        let pretty = serde_json::to_string_pretty(row)?;
        writeln!(out, "\nRow {n} as JSON:")?;
        writeln!(out, "{pretty}")?;

        if let Some(dir) = &cli.retrieve_save {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            let out_path = dir.join(format!("row_{n}.json"));
            fs::write(&out_path, &pretty).with_context(|| format!("writing {}", out_path.display()))?;
            writeln!(out, "Saved row {n} to: {}", out_path.display())?;
        }
    }

    if let Some(path) = &cli.csv {
        write_csv(path, &summary.rows).with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "\nCSV written to: {}", path.display())?;
    }
    if let Some(path) = &cli.json {
        write_ndjson(path, &summary.rows).with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "NDJSON written to: {}", path.display())?;
    }
    Ok(())
}
