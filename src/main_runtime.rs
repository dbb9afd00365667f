use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use warehouse::config::LoggingConfig;

/// Install the global subscriber
///
/// The returned guard owns the file writer's worker; queued lines are flushed
/// when it drops, so keep it alive until the command has finished.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Option<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_directive = if verbose {
        "info,warehouse=debug".to_string()
    } else {
        config.level.clone()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (file_layer, guard) = match config.dir.as_deref().and_then(file_writer) {
        Some((writer, guard)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // No color codes in file
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Console layers write to stderr so `--json` output on stdout stays clean
    let (plain_layer, json_layer) = if config.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        )
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    if file_logging_enabled && verbose {
        if let Some(dir) = &config.dir {
            eprintln!("Logging to: {}/warehouse.log", dir.display());
        }
    }

    guard
}

/// Daily rotating file writer behind a background worker
fn file_writer(log_dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    // `tracing_appender::rolling::daily` panics (and in our release build, aborts)
    // if it can't create the initial log file, so preflight writability.
    if !log_dir_writable(log_dir) {
        return None;
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "warehouse.log");
    Some(tracing_appender::non_blocking(file_appender))
}

fn log_dir_writable(log_dir: &Path) -> bool {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "Warning: Could not create log directory {} ({}), file logging disabled",
            log_dir.display(),
            e
        );
        return false;
    }

    let test_path = log_dir.join(".warehouse_write_test");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);
            true
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                log_dir.display(),
                e
            );
            false
        }
    }
}
