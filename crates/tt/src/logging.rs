//! Log setup.
//!
//! Logs go to stderr without timestamps so stdout stays a clean result
//! stream. The filter comes from `TALLY_LOG`, falling back to a level picked
//! by `--verbose` / `--quiet`.

use std::io;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TALLY_LOG";

/// Returns the default filter directive for the verbosity flags.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Installs the global subscriber.
///
/// A second call leaves the first subscriber in place.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
