//! Logging initialisation
//!
//! Structured logs go to stderr so they never mix with the progress lines
//! the commands print to stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter in debug builds
pub const DEBUG_FILTER: &str = "info,crudgen=debug,crudgen_cli=debug";
/// Default filter in release builds
pub const RELEASE_FILTER: &str = "warn,crudgen=info,crudgen_cli=info";
/// Filter used by `--verbose`
pub const VERBOSE_FILTER: &str = "info,crudgen=debug,crudgen_cli=debug,sqlx=info";

/// Pick the filter directives: `RUST_LOG` wins, then `--verbose`, then the build default
#[must_use]
pub fn filter_directives(rust_log: Option<&str>, verbose: bool) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives.to_string(),
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ if cfg!(debug_assertions) => DEBUG_FILTER.to_string(),
        _ => RELEASE_FILTER.to_string(),
    }
}

/// Initialize logging for the CLI
///
/// Pretty output in debug builds, compact single-line output otherwise.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// crudgen_cli::observability::init(false)?;
/// tracing::info!("crudgen started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber
/// is already installed.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = EnvFilter::try_new(filter_directives(rust_log.as_deref(), verbose))?;

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
