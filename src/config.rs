//! Run configuration shared by the binaries.
//!
//! Each tool flattens the argument groups it needs into its own `clap`
//! parser and turns them into a [`RunConfig`] before touching the data.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use crate::error::Result;
use crate::path::FieldPath;
use crate::source::load_records;

/// Evaluation details file the tools look for when `--path` is omitted.
pub const DEFAULT_INPUT: &str =
    "details_community_lexam-en-idk_0_2025-11-18T18-17-53.491808.parquet";

/// Sample row numbers shown per unique value.
pub const DEFAULT_SHOW: usize = 5;

pub const DEFAULT_ANSWERS_DIR: &str = "analysis/answers";

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Records file (.parquet, .json, .jsonl or .ndjson)
    #[arg(long = "path", visible_alias = "input", value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub path: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Write an info-level log file into this directory (stderr warnings otherwise)
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Raise stderr logging to info
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything one analysis run needs, fixed at the CLI boundary.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub field: FieldPath,
    pub output: Option<PathBuf>,
    pub show: usize,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, field: FieldPath) -> Self {
        Self {
            input: input.into(),
            field,
            output: None,
            show: DEFAULT_SHOW,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_show(mut self, show: usize) -> Self {
        self.show = show;
        self
    }

    pub fn load(&self) -> Result<Vec<Value>> {
        load_records(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn input_defaults_to_details_file() {
        let cli = Cli::parse_from(["tool"]);
        assert_eq!(cli.input.path, PathBuf::from(DEFAULT_INPUT));
        assert!(cli.log.log_dir.is_none());
        assert!(!cli.log.verbose);
    }

    #[test]
    fn input_accepts_alias() {
        let cli = Cli::parse_from(["tool", "--input", "rows.json", "--log-dir", "logs", "-v"]);
        assert_eq!(cli.input.path, PathBuf::from("rows.json"));
        assert_eq!(cli.log.log_dir, Some(PathBuf::from("logs")));
        assert!(cli.log.verbose);
    }

    #[test]
    fn run_config_builder() {
        let cfg = RunConfig::new("rows.json", FieldPath::parse("doc.x"))
            .with_show(2)
            .with_output(Some("out.json".into()));
        assert_eq!(cfg.show, 2);
        assert_eq!(cfg.field.to_string(), "doc.x");
        assert_eq!(cfg.output, Some(PathBuf::from("out.json")));
    }
}
