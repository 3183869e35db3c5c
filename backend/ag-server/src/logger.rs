use crate::error::{Result as ServerErrorResult, ServerError};

use ag_config::LoggingConfig;

use std::path::Path;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, Record, info};

/// Install the global `log` dispatcher.
///
/// Stdout always receives output, coloured when `colored` is set. When
/// `log_file` is given the same lines are appended there without colour.
/// Events emitted through `tracing` are bridged into the same sink.
pub fn initialize(config: &LoggingConfig, log_file: Option<&Path>) -> ServerErrorResult<()> {
    let level: LevelFilter = config.level.into();

    let stdout = if config.colored {
        let colors = ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "[{} - {}] {} [{}]",
                    humantime::format_rfc3339_millis(SystemTime::now()),
                    colors.color(record.level()),
                    message,
                    source(record)
                ))
            })
            .chain(std::io::stdout())
    } else {
        plain().chain(std::io::stdout())
    };

    let mut dispatch = Dispatch::new()
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", LevelFilter::Warn)
        .chain(stdout);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = fern::log_file(path).map_err(|e| ServerError::Logger {
            message: format!("Failed to open log file {}: {}", path.display(), e),
        })?;
        dispatch = dispatch.chain(plain().chain(file));
    }

    dispatch.apply().map_err(|e| ServerError::Logger {
        message: format!("Failed to initialize logger: {e}"),
    })?;

    tracing_log::LogTracer::init().ok();

    match log_file {
        Some(path) => info!("Logger initialized: level={}, file={}", level, path.display()),
        None => info!("Logger initialized: level={}, stdout", level),
    }

    Ok(())
}

fn plain() -> Dispatch {
    Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "[{} - {}] {} [{}]",
            humantime::format_rfc3339_millis(SystemTime::now()),
            record.level(),
            message,
            source(record)
        ))
    })
}

fn source(record: &Record) -> String {
    format!(
        "{}:{}",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0)
    )
}
