use std::{net::SocketAddr, path::Path, sync::Arc};

use api_relay::{
    adapters::{CorsHeaders, HttpClientAdapter, RelayHandler, TracingObserver},
    config::{RelayConfig, RelayConfigValidator, loader::load_config},
    core::RelayService,
    ports::{http_client::HttpClient, observer::RelayObserver},
    tracing_setup,
    utils::GracefulShutdown,
};
use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Start the relay server (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Some(Commands::Validate { config }) => validate_config_command(&config).await,
        Some(Commands::Init { config }) => init_config_command(&config).await,
        Some(Commands::Serve { config }) => serve(&config).await,
        None => serve(&args.config).await,
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let config: RelayConfig = load_config(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    RelayConfigValidator::validate(&config).context("Invalid configuration")?;

    tracing_setup::init_tracing(&config.logging)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    let http_client: Arc<dyn HttpClient> =
        Arc::new(HttpClientAdapter::new().context("Failed to create HTTP client adapter")?);
    let observer: Arc<dyn RelayObserver> = Arc::new(TracingObserver);

    let relay = Arc::new(
        RelayService::new(&config.upstream, http_client, observer)
            .context("Failed to create relay service")?,
    );
    let cors = CorsHeaders::from_config(&config.cors).context("Invalid CORS configuration")?;
    let app = Arc::new(RelayHandler::new(relay, config.max_body_bytes)).router(cors);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .context("Failed to parse listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!(
        "Relaying {}/* on {} to {}{}",
        config.upstream.prefix,
        addr,
        config.upstream.origin,
        config.upstream.prefix
    );

    let graceful_shutdown = Arc::new(GracefulShutdown::new());
    let signal_handler_shutdown = graceful_shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signal_handler_shutdown.run_signal_handler().await {
            tracing::error!("Signal handler error: {}", e);
        }
    });

    let shutdown_wait = graceful_shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = shutdown_wait.wait_for_shutdown_signal().await;
            tracing::info!("Shutdown signal received: {:?}", reason);
        })
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown completed");
    Ok(())
}

/// Validate configuration file and exit
async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("Configuration parsing failed:");
            eprintln!("   {e:#}");
            std::process::exit(1);
        }
    };

    match RelayConfigValidator::validate(&config) {
        Ok(()) => {
            println!("Configuration validation: OK");
            println!();
            println!("Configuration Summary:");
            println!("   Listen Address: {}", config.listen_addr);
            println!("   Upstream: {}{}", config.upstream.origin, config.upstream.prefix);
            println!(
                "   Excluded Headers: {}",
                config.upstream.excluded_headers.join(", ")
            );
            println!("   CORS Origin: {}", config.cors.allow_origin);
            println!("   Max Body Bytes: {}", config.max_body_bytes);
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("Common fixes:");
            println!("   - upstream.origin must be scheme://host[:port] with no path");
            println!("   - upstream.prefix must start with '/' and not end with '/'");
            println!("   - listen_addr must look like '127.0.0.1:3000'");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# API relay configuration
# Any value can be overridden with API_RELAY__<SECTION>__<KEY>, e.g.
# API_RELAY__UPSTREAM__ORIGIN=http://10.0.0.5:8000

# The address to listen on
listen_addr = "127.0.0.1:3000"

# Largest inbound body accepted, in bytes
max_body_bytes = 10485760

[upstream]
# Every request under `prefix` is sent to origin + prefix + rest
origin = "http://127.0.0.1:8000"
prefix = "/api"
excluded_headers = ["host", "connection", "content-length"]

[cors]
allow_origin = "*"
allow_credentials = true
allow_methods = ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
allow_headers = ["Content-Type", "Authorization", "Cookie"]

[logging]
level = "info"
json = true
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("Created default configuration at: {config_path}");
    println!("   Run 'api-relay serve --config {config_path}' to start the relay");
    Ok(())
}
