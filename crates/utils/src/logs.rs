use bevy::prelude::*;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIRECTORY: &str = "logs";
const DEFAULT_FILTER: &str = "info";

/// Name of the log file for a run: the suffix when one is given (usually the
/// correlation id), otherwise the local start time.
pub fn log_file_name(suffix: Option<&str>) -> String {
    let suffix = suffix.map_or_else(
        || Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
        str::to_string,
    );
    format!("horde_server_{}.log", suffix)
}

/// Installs the global tracing subscriber: a non-blocking file layer under
/// `logs/` plus a stdout layer. The returned guard must outlive the app or
/// buffered lines are lost on exit.
pub fn setup_logging(suffix: Option<&str>) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_directory = Path::new(LOG_DIRECTORY);
    if !log_directory.exists() {
        fs::create_dir_all(log_directory)?;
    }

    let log_file_path: PathBuf = log_directory.join(log_file_name(suffix));

    let (non_blocking_writer, guard) = match fs::File::create(&log_file_path) {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("Failed to create log file {:?}: {}", log_file_path, e);
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            let subscriber = tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
                .with(fmt::Layer::new().with_writer(writer));
            tracing::subscriber::set_global_default(subscriber)?;
            return Ok(guard);
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking_writer)
                .without_time()
                .with_ansi(false),
        )
        .with(fmt::Layer::new().with_writer(std::io::stdout));

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized. Log file: {:?}", log_file_path);

    Ok(guard)
}
