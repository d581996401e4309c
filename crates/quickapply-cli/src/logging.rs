use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub const LOG_FILE: &str = "quickapply.log";

/// Keeps logging installed; dropping it flushes the log file and removes
/// the subscriber
pub struct LoggingGuard {
    _subscriber: DefaultGuard,
    _file: Option<WorkerGuard>,
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(
            "quickapply=debug,quickapply_cli=debug,quickapply_core=debug,\
             quickapply_browser=debug,quickapply_driver=debug",
        )
    } else {
        EnvFilter::new(
            "quickapply=info,quickapply_cli=info,quickapply_core=info,\
             quickapply_browser=info,quickapply_driver=info",
        )
    }
}

fn file_filter() -> EnvFilter {
    EnvFilter::new(
        "quickapply=debug,quickapply_cli=debug,quickapply_core=debug,\
         quickapply_browser=debug,quickapply_driver=debug",
    )
}

/// Install console logging and, when `log_dir` is given, a debug-level log
/// file in that directory
///
/// Logging lasts until the returned guard is dropped.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> LoggingGuard {
    let console = fmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(console_filter(verbose));

    let (file_layer, file_guard) = match log_dir.map(open_log_file) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter());
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: file logging disabled: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry().with(console).with(file_layer);
    LoggingGuard {
        _subscriber: tracing::subscriber::set_default(subscriber),
        _file: file_guard,
    }
}

fn open_log_file(
    dir: &Path,
) -> std::io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    Ok(tracing_appender::non_blocking(appender))
}
