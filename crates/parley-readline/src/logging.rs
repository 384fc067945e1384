//! Log setup for the REPL.
//!
//! Output goes to a daily-rolling file so log lines never interleave with the
//! conversation on the terminal.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "PARLEY_LOG";

/// Installs the global subscriber writing to `<logs_dir>/parley.log.YYYY-MM-DD`.
///
/// The returned guard flushes buffered lines when dropped; keep it alive for
/// the life of the process.
pub fn init(logs_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(logs_dir, "parley.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt_layer)
        .init();

    guard
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}
