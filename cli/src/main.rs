use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use textsim_compare::{ComparisonConfig, ComparisonSession, HttpModelLoader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

/// Compare two texts by the cosine similarity of their sentence embeddings.
#[derive(Debug, Parser)]
#[command(name = "textsim", version)]
struct Cli {
    /// Text entered by the user.
    #[arg(long, required_unless_present = "user_file", conflicts_with = "user_file")]
    user: Option<String>,

    /// Read the user text from a file.
    #[arg(long, value_name = "PATH")]
    user_file: Option<PathBuf>,

    /// Reference text to compare against.
    #[arg(
        long,
        required_unless_present = "expected_file",
        conflicts_with = "expected_file"
    )]
    expected: Option<String>,

    /// Read the expected text from a file.
    #[arg(long, value_name = "PATH")]
    expected_file: Option<PathBuf>,

    /// Config file (defaults to the user config directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the model endpoint.
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Override the model name.
    #[arg(long)]
    model: Option<String>,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let user = read_text(cli.user, cli.user_file.as_ref())?;
    let expected = read_text(cli.expected, cli.expected_file.as_ref())?;

    debug!("Using model endpoint {}", config.model.endpoint);

    let session = ComparisonSession::new();
    session
        .load(&HttpModelLoader::new(config.model.clone()))
        .await
        .map_err(|err| anyhow!(err.user_message()))?;

    let outcome = session
        .compare(&user, &expected)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render::summary(&outcome, &config.display));
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ComparisonConfig> {
    let mut config = match &cli.config {
        Some(path) => ComparisonConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ComparisonConfig::load_default().context("failed to load default config")?,
    };

    if let Some(endpoint) = &cli.endpoint {
        config.model.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.model {
        config.model.model = Some(model.clone());
    }

    Ok(config)
}

fn read_text(inline: Option<String>, file: Option<&PathBuf>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => Err(anyhow!("no text given")),
    }
}
