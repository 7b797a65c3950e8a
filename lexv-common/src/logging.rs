//! Tracing initialisation shared by the lexv binaries
//!
//! Logs always go to standard error: standard output carries validated
//! records when the validator streams.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` wins when set. Otherwise `debug` forces debug output for the
/// lexv crates and `level` (from the TOML `[logging]` table) applies.
pub fn init_tracing(level: &str, debug: bool) {
    let fallback = if debug {
        "lexv_common=debug,lexv_vd=debug,lexv_lp=debug".to_string()
    } else {
        format!("lexv_common={0},lexv_vd={0},lexv_lp={0}", level)
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // May already be set when called from tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
