use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

use crate::config::LogArgs;
use crate::error::Result;

/// `<dir>/<tool>_<timestamp>.log`
pub fn log_file_path(dir: &Path, tool: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("{tool}_{timestamp}.log"))
}

/// File logger at info level when `--log-dir` is set, stderr logger otherwise.
/// Returns the log file path, if any.
pub fn init_logging(tool: &str, args: &LogArgs) -> Result<Option<PathBuf>> {
    match &args.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let log_path = log_file_path(dir, tool);
            WriteLogger::init(LevelFilter::Info, Config::default(), File::create(&log_path)?)?;
            info!("{tool} started");
            Ok(Some(log_path))
        }
        None => {
            let level = if args.verbose {
                LevelFilter::Info
            } else {
                LevelFilter::Warn
            };
            TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_named_after_tool() {
        let path = log_file_path(Path::new("logs"), "count_choices");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("count_choices_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("logs")));
    }
}
