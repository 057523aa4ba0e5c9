//! Handler runtime configuration
//!
//! Lambda passes no arguments, so everything comes from environment variables
//! set on the function. Flags exist for local runs.

use crate::logging::LogFormat;
use clap::Parser;
use glvar_gitlab::client::DEFAULT_USER_AGENT;

/// Runtime configuration of the `bootstrap` binary
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootstrap",
    version,
    about = "Publishes Secrets Manager values as protected GitLab project variables"
)]
pub struct HandlerConfig {
    /// Log output format
    #[arg(long, env = "GLVAR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Tracing filter directive; `RUST_LOG` is used when unset
    #[arg(long, env = "GLVAR_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// User agent for GitLab and CloudFormation requests
    #[arg(long, env = "GLVAR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl HandlerConfig {
    /// Read configuration from the environment only.
    ///
    /// # Errors
    ///
    /// Returns a clap error when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from(["bootstrap"])
    }
}
