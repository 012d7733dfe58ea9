//! Logging setup.

use std::ffi::OsStr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Setup logging with the given level.
///
/// Console output goes to stderr so stdout stays free for command results.
/// `RUST_LOG` takes precedence over `level`. When `file` is given, events are
/// also written there as JSON; keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().pretty().with_writer(std::io::stderr).boxed());
    }

    let guard = file.map(|path| {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().unwrap_or_else(|| OsStr::new("risk.log"));
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
        guard
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();

    guard
}
