use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use huffman_service::codec::Compressed;
use huffman_service::config::ServiceConfig;
use huffman_service::error::{HuffmanError, Result};
use huffman_service::render::{self, TreeLayout};
use huffman_service::service::HuffmanService;
use huffman_service::session::SessionStore;

#[derive(Parser)]
#[command(name = "huffman-service")]
#[command(about = "Huffman text compression service with tree visualization")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Start the HTTP API on the default port
    huffman-service serve

    # Start on another port with a config file
    huffman-service --config huffman.toml serve --port 8080

    # Start the MCP server on stdio
    huffman-service mcp

    # Show codes and the encoded bits for a text
    huffman-service encode "abracadabra"

    # Write the tree of a file's contents as PNG and PDF
    huffman-service render --file notes.txt --png tree.png --pdf tree.pdf
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Code table and bits for reading
    Text,
    /// The same fields as the encrypt response
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the MCP server on stdio
    Mcp,
    /// Encode text and print its code table and bits
    Encode {
        /// Text to encode
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Render the tree for a text to image or document files
    Render {
        /// Text to build the tree from
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Write a PNG image here
        #[arg(long)]
        png: Option<PathBuf>,
        /// Write a PDF document here
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = ServiceConfig::load(path)?;
    if let Some(path) = path {
        tracing::info!("Loaded config from {}", path.display());
    }
    Ok(config)
}

pub async fn run_http_server(
    mut config: ServiceConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = HuffmanService::from_config(&config);
    let sweeper = spawn_session_sweeper(service.store().clone(), config.sweep_interval());

    let result = huffman_service::http::run_server(&config.server, service).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result?;

    Ok(())
}

pub async fn run_mcp_server(config: ServiceConfig) -> Result<()> {
    use crate::mcp::McpServer;
    use rmcp::ServiceExt;

    let service = HuffmanService::from_config(&config);
    let sweeper = spawn_session_sweeper(service.store().clone(), config.sweep_interval());
    let server = McpServer::new(service);

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let running = server
        .serve(transport)
        .await
        .map_err(|e| HuffmanError::Mcp(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| HuffmanError::Mcp(e.to_string()))?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    Ok(())
}

/// Periodically drops sessions idle past the store's limit.
pub fn spawn_session_sweeper(
    store: SessionStore,
    every: Option<Duration>,
) -> Option<tokio::task::JoinHandle<()>> {
    let every = every?;
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.cleanup_expired();
            if removed > 0 {
                tracing::debug!("Swept {} expired sessions, {} live", removed, store.len());
            }
        }
    }))
}

pub fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) => Err(HuffmanError::InvalidInput(
            "pass the text as an argument or with --file".to_string(),
        )),
    }
}

pub fn encode_text(text: &str, format: OutputFormat) -> Result<()> {
    let compressed = Compressed::from_text(text)?;

    if format == OutputFormat::Json {
        let output = serde_json::json!({
            "codeTable": compressed
                .codes
                .iter()
                .map(|(symbol, code)| (symbol.to_string(), code.to_string()))
                .collect::<Vec<_>>(),
            "encodedText": compressed.payload.to_bit_string(),
            "bitCount": compressed.payload.bit_count(),
            "packedPayload": compressed.payload.to_base64(),
            "originalLength": compressed.text_length,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("Code table ({} symbols):", compressed.codes.len());
    for (symbol, code) in compressed.codes.iter() {
        let count = compressed.frequencies.get(symbol).unwrap_or(0);
        println!("  {:>8}  {:>6}  {}", render::symbol_label(symbol), count, code);
    }
    println!();
    println!(
        "{} symbols -> {} bits ({:.1}% of 8-bit)",
        compressed.text_length,
        compressed.payload.bit_count(),
        compressed.ratio() * 100.0
    );
    println!("{}", compressed.payload.to_bit_string());

    Ok(())
}

pub fn render_tree(
    text: &str,
    png: Option<&Path>,
    pdf: Option<&Path>,
    config: &ServiceConfig,
) -> Result<()> {
    if png.is_none() && pdf.is_none() {
        return Err(HuffmanError::InvalidInput(
            "pass --png and/or --pdf to choose an output".to_string(),
        ));
    }

    let compressed = Compressed::from_text(text)?;
    let layout = TreeLayout::compute(&compressed.tree);

    if let Some(path) = png {
        let bytes = render::render_png(&layout)?;
        fs::write(path, &bytes)?;
        println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    }
    if let Some(path) = pdf {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tree".to_string());
        let header = format!("Huffman tree - {}", title);
        let bytes = render::export_pdf(&layout, &header, config.render.pdf_min_scale)?;
        fs::write(path, &bytes)?;
        let grid = render::plan_pages(&layout, config.render.pdf_min_scale);
        println!(
            "Wrote {} ({} bytes, {} page(s))",
            path.display(),
            bytes.len(),
            grid.pages()
        );
    }

    Ok(())
}
