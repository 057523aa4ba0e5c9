//! Tracing setup for the handler binary
//!
//! CloudWatch captures stdout/stderr, so JSON lines on stderr are the default.

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when neither `GLVAR_LOG_FILTER` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str =
    "glvar_handler=info,glvar_gitlab=info,glvar_secrets=info,glvar_aws=info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Compact single-line text
    Compact,
    /// Multi-line human-readable text
    Pretty,
}

/// Build the filter: explicit directive, then `RUST_LOG`, then [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns an error if the explicit directive does not parse.
pub fn build_filter(filter: Option<&str>) -> miette::Result<EnvFilter> {
    match filter {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER)),
    }
    .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init_tracing(format: LogFormat, filter: Option<&str>) -> miette::Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(filter)?);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };
    result.map_err(|e| miette::miette!("Failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?format,
        "Tracing initialized for glvar handler"
    );
    Ok(())
}
