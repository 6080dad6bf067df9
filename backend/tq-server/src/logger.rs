use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt::Arguments;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record, info};

/// Install the global logger.
///
/// Lines go to `log_file` when one is given (appending, never colored),
/// otherwise to stdout, colored when `colored` is set. sqlx is capped at
/// warn since it logs every statement at info.
pub fn initialize(
    log_level: tq_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level = *log_level;

    let output = match log_file {
        Some(ref path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ServerError::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;
            Dispatch::new().format(plain).chain(file)
        }
        None if colored => {
            let colors = level_colors();
            Dispatch::new()
                .format(move |out, message, record| {
                    write_line(out, colors.color(record.level()), message, record)
                })
                .chain(std::io::stdout())
        }
        None => Dispatch::new().format(plain).chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(level)
        .level_for("sqlx", LevelFilter::Warn)
        .chain(output)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: e.to_string(),
        })?;

    let target = log_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!("Logging at {} to {}", level, target);

    Ok(())
}

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta)
}

fn plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_line(out, record.level(), message, record)
}

fn write_line(
    out: FormatCallback,
    level: impl std::fmt::Display,
    message: &Arguments,
    record: &Record,
) {
    out.finish(format_args!(
        "[{} - {}] {} [{}]",
        humantime::format_rfc3339(SystemTime::now()),
        level,
        message,
        record.target(),
    ))
}
