//! maven-central-mcp: MCP server for resolving Maven Central dependency versions
//!
//! This tool lets AI assistants look up the latest versions of Maven
//! dependencies, check whether a version exists, and list recent releases.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use maven_central_mcp::config::{self, Config};
use maven_central_mcp::maven::MavenCentralClient;
use maven_central_mcp::mcp::{
    HttpTransport, McpServer, SessionLimits, StdioTransport, Transport,
};

/// Default bind address when only a port is given.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port when only a host is given.
const DEFAULT_PORT: u16 = 8080;

/// MCP server for resolving Maven Central dependency versions.
///
/// Serves over stdio by default. Passing --host or --port (or setting them
/// in the configuration file) serves over HTTP instead.
#[derive(Parser, Debug)]
#[command(name = "maven-central-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Host to bind the HTTP transport to
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the HTTP transport to
    #[arg(long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries protocol messages, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Picks the transport: HTTP when a host or port is configured, stdio otherwise.
///
/// CLI flags take precedence over the configuration file.
fn select_transport(args: &Args, cfg: &Config) -> Box<dyn Transport> {
    let host = args.host.clone().or_else(|| cfg.server.host.clone());
    let port = args.port.or(cfg.server.port);

    if host.is_none() && port.is_none() {
        return Box::new(StdioTransport::new());
    }

    let limits = SessionLimits {
        max_sessions: cfg.server.max_sessions,
        idle_timeout: Duration::from_secs(cfg.server.session_idle_secs),
    };

    Box::new(
        HttpTransport::new(
            host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port.unwrap_or(DEFAULT_PORT),
        )
        .with_limits(limits),
    )
}

/// Entry point for the maven-central-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nDefault config location: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting maven-central-mcp server"
    );

    let client = match MavenCentralClient::new(&cfg.search) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create search client");
            return ExitCode::FAILURE;
        }
    };

    info!(
        endpoint = client.base_url(),
        rows = cfg.search.rows,
        "Search endpoint configured"
    );

    let server = Arc::new(McpServer::new(Arc::new(client)));
    let transport = select_transport(&args, &cfg);

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(transport.serve(server));

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
