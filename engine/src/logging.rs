use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the stderr fmt subscriber. `verbosity` counts `-v` flags:
/// 0 → warn, 1 → info, 2 → debug, more → trace. `RUST_LOG` still applies on top.
/// Calling it twice is harmless.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
