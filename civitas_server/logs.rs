use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `civitas` is this binary, `civitas_app` holds the schedulers and the loop.
const DEFAULT_FILTER: &str = "info,civitas=debug,civitas_app=debug";

/// Sets up the logging configuration for the application.
///
/// Logs go both to stdout and to a daily rotating file in `logs/`.
/// Levels come from `RUST_LOG`, falling back to `info` for everything and
/// `debug` for the binary and the app crate.
pub fn setup_logging() {
    let file_appender = tracing_appender::rolling::daily("logs", "civitas.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_thread_ids(true)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // the file writer stops when the guard drops, keep it for the whole run
    std::mem::forget(guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("civitas=debug"));
        assert!(rendered.contains("civitas_app=debug"));
        assert!(!rendered.contains("civitas_server"));
    }
}
