//! Logger initialization.

use std::io::Write;

use colored::*;
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependency modules that are clamped regardless of the requested level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("sqlx", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
];

/// Installs the global logger.
///
/// `RUST_LOG` is read first and `level` is applied on top of it, so
/// per-module directives such as `RUST_LOG=page_trust::coordinator=trace`
/// still work while `--log-level` sets the baseline.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` when a logger is already
/// installed in this process.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, ceiling) in QUIET_MODULES {
        builder.filter_module(module, (*ceiling).min(level));
    }
    builder.filter_module("page_trust", level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    builder.try_init()?;
    Ok(())
}

fn write_json(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let msg = serde_json::to_string(&record.args().to_string()).unwrap_or_else(|_| "\"\"".into());
    writeln!(
        buf,
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
        chrono::Utc::now().timestamp_millis(),
        record.level(),
        record.target(),
        msg
    )
}

fn write_plain(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let label = record.level().to_string();
    let label = match record.level() {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    };
    writeln!(buf, "{} [{}] {}", record.target().cyan(), label, record.args())
}
