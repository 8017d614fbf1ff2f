//! Sbirka MCP Server entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use sbirka::{
    BrowserFetcher, FetchMode, HttpFetcher, Kurzy, MarkupFetcher, RenderOptions, SourceChain,
    ZakonyProLidi,
};
use sbirka_mcp::config::{ConfigOverrides, ServerConfig};
use sbirka_mcp::protocol::ProtocolHandler;
use sbirka_mcp::tools::ToolRegistry;
use sbirka_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "sbirka-mcp",
    about = "MCP server for Czech legal documents (Sbírka zákonů)",
    version
)]
struct Cli {
    /// Base URL of the primary provider (zakonyprolidi.cz).
    #[arg(long, global = true)]
    primary_url: Option<String>,

    /// Base URL of the secondary provider (kurzy.cz).
    #[arg(long, global = true)]
    secondary_url: Option<String>,

    /// Markup transport for both providers: "static" or "rendered".
    #[arg(long, global = true)]
    fetch_mode: Option<String>,

    /// Transport override for the primary provider only.
    #[arg(long, global = true)]
    primary_mode: Option<String>,

    /// Transport override for the secondary provider only.
    #[arg(long, global = true)]
    secondary_mode: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   sbirka-mcp completions bash > ~/.local/share/bash-completion/completions/sbirka-mcp
    ///   sbirka-mcp completions zsh > ~/.zfunc/_sbirka-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = ServerConfig::resolve(&ConfigOverrides {
                primary_url: cli.primary_url,
                secondary_url: cli.secondary_url,
                fetch_mode: cli.fetch_mode,
                primary_mode: cli.primary_mode,
                secondary_mode: cli.secondary_mode,
            })
            .map_err(anyhow::Error::msg)?;

            serve(config).await?;
        }

        Commands::Info => {
            let capabilities = sbirka_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sbirka-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Primary: {} ({} mode), secondary: {} ({} mode)",
        config.primary_url,
        config.primary_mode,
        config.secondary_url,
        config.secondary_mode
    );

    let primary_fetcher = build_fetcher(config.primary_mode);
    let secondary_fetcher = if config.secondary_mode == config.primary_mode {
        Arc::clone(&primary_fetcher)
    } else {
        build_fetcher(config.secondary_mode)
    };

    let primary = Arc::new(ZakonyProLidi::with_base(
        Arc::clone(&primary_fetcher),
        &config.primary_url,
    ));
    let secondary = Arc::new(Kurzy::with_base(
        Arc::clone(&secondary_fetcher),
        &config.secondary_url,
    ));
    let chain = Arc::new(SourceChain::new(primary, secondary));

    let handler = ProtocolHandler::new(chain);
    let transport = StdioTransport::new(handler);

    tokio::select! {
        result = transport.run() => {
            if let Err(e) = result {
                tracing::error!("Transport error: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, shutting down");
        }
    }

    // The rendered fetcher holds a shared Chromium process; give it a
    // bounded chance to close before the process exits.
    primary_fetcher.shutdown().await;
    if !Arc::ptr_eq(&primary_fetcher, &secondary_fetcher) {
        secondary_fetcher.shutdown().await;
    }

    Ok(())
}

fn build_fetcher(mode: FetchMode) -> Arc<dyn MarkupFetcher> {
    match mode {
        FetchMode::Static => Arc::new(HttpFetcher::default()),
        FetchMode::Rendered => Arc::new(BrowserFetcher::new(RenderOptions::default())),
    }
}
