//! OOSA MCP Server: entry point.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use oosa_mcp::config::{self, ServeSettings};
use oosa_mcp::lifecycle::{self, Coordinator};
use oosa_mcp::types::InitializeResult;
use oosa_mcp::{Backend, HandlerRegistry};

#[derive(Parser)]
#[command(
    name = "oosa-mcp-server",
    about = "MCP server for OOSA: outdoor events, activity ideas, and Taipei attractions",
    version
)]
struct Cli {
    /// TOML config file (defaults to ./.oosa-mcp-server.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to info, or
    /// debug when logging to a file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server (default).
    Serve(ServeArgs),

    /// Print server capabilities, tools, and resources as JSON.
    Info {
        /// Attractions JSON file to load instead of the built-in catalogue.
        #[arg(long)]
        attractions: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   oosa-mcp-server completions bash > ~/.local/share/bash-completion/completions/oosa-mcp-server
    ///   oosa-mcp-server completions zsh > ~/.zfunc/_oosa-mcp-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Transport to serve on (stdio or sse).
    #[arg(long)]
    transport: Option<String>,

    /// Listen address for the sse transport (host:port).
    #[arg(long)]
    addr: Option<String>,

    /// Externally visible base URL for the sse transport.
    #[arg(long)]
    base_url: Option<String>,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log every raw read and write on the stdio streams.
    #[arg(long)]
    enable_command_logging: bool,

    /// Seconds to let sse connections drain on shutdown.
    #[arg(long)]
    drain_timeout_secs: Option<u64>,

    /// Attractions JSON file to load instead of the built-in catalogue.
    #[arg(long)]
    attractions: Option<PathBuf>,
}

impl ServeArgs {
    fn into_settings(self) -> ServeSettings {
        ServeSettings {
            transport: self.transport,
            addr: self.addr,
            base_url: self.base_url,
            log_file: self.log_file,
            enable_command_logging: self.enable_command_logging.then_some(true),
            drain_timeout_secs: self.drain_timeout_secs,
            attractions: self.attractions,
        }
    }
}

#[tokio::main]
async fn main() {
    // Exit explicitly: a pending blocking read on stdin would otherwise keep
    // the runtime alive after shutdown.
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            let settings = config::resolve_settings(args.into_settings(), cli.config.as_deref())?;
            init_tracing(cli.log_level.as_deref(), settings.log_file.as_deref())?;

            let reason = Coordinator::new(settings)
                .run(lifecycle::shutdown_signal())
                .await?;
            tracing::info!(?reason, "Server stopped");
        }

        Commands::Info { attractions } => {
            let cli_layer = ServeSettings {
                attractions,
                ..ServeSettings::default()
            };
            let settings = config::resolve_settings(cli_layer, cli.config.as_deref())?;
            let backend = Backend::open(settings.attractions.as_deref())?;
            let registry = HandlerRegistry::with_defaults(Arc::new(backend))?;
            let init = InitializeResult::default_result();
            let tools = registry.tools().list_tools();
            let info = serde_json::json!({
                "server": init.server_info,
                "protocol_version": init.protocol_version,
                "capabilities": init.capabilities,
                "tools": tools,
                "tool_count": tools.len(),
                "resources": registry.resources().list_resources(),
                "resource_templates": registry.resources().list_templates(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "oosa-mcp-server", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Logs go to stderr, or to `log_file` when set; stdout carries the stdio
/// protocol.
fn init_tracing(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = log_level.unwrap_or(if log_file.is_some() { "debug" } else { "info" });
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
