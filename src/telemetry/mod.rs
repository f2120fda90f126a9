//! Log output.
//!
//! `tracing` events are formatted by `tracing-subscriber`. In the browser the
//! lines go to `console.*` through `tracing-web`; native builds (tests) write
//! to stderr.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub fn max_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init() {
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_target(true);

    #[cfg(target_arch = "wasm32")]
    let layer = layer.with_writer(tracing_web::MakeWebConsoleWriter::new());
    #[cfg(not(target_arch = "wasm32"))]
    let layer = layer.with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(layer.with_filter(max_level()))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_builds_log_debug() {
        assert_eq!(max_level() == LevelFilter::DEBUG, cfg!(debug_assertions));
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        tracing::info!("telemetry ready");
    }
}
