use anyhow::Result;
use clap::Parser;
use mcp_calculator_rs::{config::Config, logging, server::ServerBuilder};
use std::path::PathBuf;
use std::process::ExitCode;

/// MCP calculator server over stdio.
#[derive(Debug, Parser)]
#[command(name = "mcp_calculator_rs", version, about)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, env = "MCP_CALCULATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, overrides the config file (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_config(&path.to_string_lossy())?,
        None => Config::default(),
    };

    let filter = match (cli.verbose, &cli.log_level) {
        (0, Some(level)) => level.clone(),
        (0, None) => config.log_level.clone(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    };
    logging::init(&filter, std::io::stderr)?;

    tracing::info!(
        name = %config.server_name,
        version = %config.server_version,
        protocol = %config.protocol_version,
        "Starting MCP server on stdio"
    );

    if let Err(e) = ServerBuilder::from_config(&config)
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
    {
        tracing::error!(error = %e, "MCP server terminated with a transport fault");
        return Ok(ExitCode::FAILURE);
    }

    tracing::info!("MCP server stopped");
    Ok(ExitCode::SUCCESS)
}
