mod api;
mod auth;
mod cli;
mod config;
mod proxy;
mod server;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use config::{default_data_dir, load_config};
use store::Store;

#[derive(Parser, Debug)]
#[command(
    name = "homeport",
    version,
    about = "A self-hosted homepage and dashboard server"
)]
struct Cli {
    /// Path to the data directory containing config.toml and data.json
    #[arg(short, long, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override the bind address (127.0.0.1 = local only, 0.0.0.0 = all interfaces)
    #[arg(long)]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query a running server's status endpoint
    Status(cli::status::StatusArgs),

    /// Manage sections on a running server
    Sections(cli::sections::SectionsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "homeport=debug,info"
    } else {
        "homeport=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    match cli.command {
        Some(Commands::Status(args)) => return cli::status::execute(args).await,
        Some(Commands::Sections(args)) => return cli::sections::execute(args).await,
        None => {}
    }

    // Ensure data directory exists
    std::fs::create_dir_all(&cli.data_dir)?;

    // Load configuration
    let config_path = cli.data_dir.join("config.toml");
    let mut config = load_config(&config_path)?;

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    // Default data file to data_dir if not set
    if config.store.path.is_none() {
        config.store.path = Some(cli.data_dir.join("data.json"));
    }

    info!("Homeport v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", cli.data_dir);

    if config.auth.password.is_none() {
        warn!("No admin password configured; using the default \"admin\". Set ADMIN_PASSWORD or [auth] password in config.toml.");
    }

    // Seed the data file on first start
    let store = Store::new(config.store.path.clone().expect("data file path is set"));
    store.init()?;

    let bind_addr: [u8; 4] = match config.server.bind.parse::<std::net::Ipv4Addr>() {
        Ok(ip) => ip.octets(),
        Err(_) => {
            warn!(
                "Invalid bind address '{}', defaulting to 127.0.0.1",
                config.server.bind
            );
            [127, 0, 0, 1]
        }
    };

    let server_handle = server::start_server(bind_addr, config.server.port, store, config);

    info!("Server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");

    info!("Shutting down...");
    server_handle.abort();
    info!("Homeport stopped.");

    Ok(())
}
