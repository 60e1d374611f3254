use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Verbosity is controlled through `RUST_LOG`; the default keeps the
/// pipeline's own events at info level while muting noisy HTTP internals.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
