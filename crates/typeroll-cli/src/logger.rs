//! Logging setup for the typeroll CLI.
//!
//! Structured logging through the `tracing` ecosystem with three levels of
//! verbosity and environment-based overrides.
//!
//! The logging level is determined in this order:
//! 1. `--verbose`: debug level for typeroll crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG` environment variable: custom filter
//! 4. default: info level for typeroll crates
//!
//! ```rust,no_run
//! use typeroll_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("typeroll=debug,typeroll_build=debug,typeroll_cli=debug")
    } else if quiet {
        EnvFilter::new("typeroll=error,typeroll_build=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("typeroll=info,typeroll_build=info"))
    };

    // NO_COLOR is the wider convention; the flag wins either way.
    let ansi = !no_color && std::env::var_os("NO_COLOR").is_none();

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(ansi)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
