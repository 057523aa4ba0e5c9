//! `glvar-synth`: render a CloudFormation template from a YAML definition

use clap::Parser;
use glvar_construct::StackDefinition;
use miette::{IntoDiagnostic, WrapErr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "glvar-synth")]
#[command(about = "Synthesize a CloudFormation template publishing secrets as GitLab variables")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'd', help = "Path to the YAML stack definition")]
    definition: PathBuf,

    #[arg(long, short = 'o', help = "Write the template here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(
        long,
        short = 'l',
        help = "Log filter directive",
        default_value = "glvar_construct=warn",
        env = "GLVAR_LOG_FILTER"
    )]
    log_filter: String,
}

#[allow(clippy::print_stdout)]
fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_filter)
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| miette::miette!("Failed to install tracing subscriber: {e}"))?;

    let template = StackDefinition::load(&cli.definition)?
        .synthesize()?
        .to_json_pretty()?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, template + "\n")
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Template written");
        }
        None => println!("{template}"),
    }
    Ok(())
}
