//! Diagnostics channel.
//!
//! Everything the library reports (reload decisions, result counts,
//! recoverable failures) goes through `tracing`. The binary installs a
//! stderr subscriber here before reading its config, then widens the filter
//! once the config says so; `RUST_LOG` always wins over the config flag.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the stderr subscriber at `RUST_LOG`, or `warn` when unset. Safe to
/// call more than once; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (filter, handle) = reload::Layer::new(filter);

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    if tracing_subscriber::registry().with(filter).with(console_layer).try_init().is_ok() {
        let _ = FILTER.set(handle);
    }
}

/// Raise the level to `debug` when the debug channel is enabled in config.
/// No-op when `RUST_LOG` is set or `init` did not install the subscriber.
pub fn set_debug_channel(enabled: bool) {
    if !enabled || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(handle) = FILTER.get() {
        if let Err(e) = handle.reload(EnvFilter::new("debug")) {
            tracing::warn!("Could not enable debug channel: {e}");
        }
    }
}
