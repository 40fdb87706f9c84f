//! Provide tracing, tailored to this program.
//!
//! The binary should call [`init`] once at startup to install a tracing
//! subscriber. Library code never installs anything; with no subscriber
//! installed the `trace!()`/`debug!()` calls sprinkled through discovery
//! are no-ops, which is the default for embedders.
//!
//! The rest of the program can include `use crate::tracing::prelude::*`
//! for convenient access to the `trace!()`, `debug!()`, `info!()`,
//! `warn!()`, and `error!()` macros.

use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{debug, error, info, trace, warn};
}

/// Initialize logging to stderr, filtering according to environment
/// variable RUST_LOG, overriding the default level (ERROR) to WARN.
///
/// The report itself goes to stdout; keeping diagnostics on stderr lets
/// the table or JSON output be piped cleanly.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(LocalTimer),
        )
        .init();
}

// Provide our own timer that formats timestamps in local time and to the
// nearest second. The default timer was in UTC and formatted timestamps as
// a long, ugly string.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = time::OffsetDateTime::now_local()
            .unwrap_or_else(|_| time::OffsetDateTime::now_utc());
        write!(
            w,
            "{}",
            now.format(time::macros::format_description!(
                "[hour]:[minute]:[second]"
            ))
            .unwrap_or_default(),
        )
    }
}
