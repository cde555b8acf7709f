mod cli;
mod mcp;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP protocol and command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huffman_service=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            cli::run_http_server(config, host, port).await?;
        }
        Commands::Mcp => {
            cli::run_mcp_server(config).await?;
        }
        Commands::Encode { text, file, format } => {
            let text = cli::read_input(text, file.as_deref())?;
            cli::encode_text(&text, format)?;
        }
        Commands::Render {
            text,
            file,
            png,
            pdf,
        } => {
            let text = cli::read_input(text, file.as_deref())?;
            cli::render_tree(&text, png.as_deref(), pdf.as_deref(), &config)?;
        }
    }

    Ok(())
}
