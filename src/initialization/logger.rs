//! Logger initialization.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first and `level` is applied on top of it, so the CLI
/// flag wins for this crate while `RUST_LOG` can still tune other modules.
/// HTTP and SQL internals are clamped to `info` to keep `-v` output readable.
///
/// # Examples
///
/// ```bash
/// # Raw service responses at debug level
/// geolocate_batch -i in.csv -o out.csv -v
///
/// # Machine-readable logs
/// geolocate_batch -i in.csv -o out.csv --log-format json
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Info.min(level));
    builder.filter_module("reqwest", LevelFilter::Info.min(level));
    builder.filter_module("hyper", LevelFilter::Info.min(level));
    builder.filter_module("hyper_util", LevelFilter::Info.min(level));
    builder.filter_module("geolocate_batch", level);
    builder.filter_module("glc_review", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red().bold(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };
                writeln!(
                    buf,
                    "{} {:>5} {} {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    colored_level,
                    record.target().dimmed(),
                    record.args()
                )
            });
        }
    }

    // try_init: tests may initialize more than once per process
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
