//! Logging setup and the prelude used throughout the crate.
//!
//! Under systemd (detected via `JOURNAL_STREAM`) events go to the journal
//! with their structured fields intact. Everywhere else they go to stderr
//! with local timestamps, leaving stdout to the front end. `RUST_LOG`
//! controls filtering in both cases.

use ::tracing::level_filters::LevelFilter;
use time::macros::format_description;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

use prelude::*;

/// Install the global subscriber.
///
/// Call once, early in `main`. Later calls are ignored.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if std::env::var_os("JOURNAL_STREAM").is_some() {
        match tracing_journald::layer() {
            Ok(journald) => {
                if tracing_subscriber::registry()
                    .with(filter)
                    .with(journald)
                    .try_init()
                    .is_ok()
                {
                    debug!("Logging to journald");
                }
                return;
            }
            Err(e) => {
                eprintln!("journald unavailable, logging to stderr: {e}");
            }
        }
    }

    let timer = fmt::time::LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(timer)
                .with_target(false),
        )
        .try_init();
}
