mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventbook::api::rest::routes;
use eventbook::api::rest::AppState;
use eventbook::domain::service::{Service, ServiceConfig};
use eventbook::infra::auth::{AuthConfig, TokenIssuer};
use eventbook::infra::storage::{DocEventsRepository, DocUsersRepository};
use eventbook::infra::weather::{DisabledForecast, ForecastProvider, OpenMeteoClient};
use eventbook_store::DocStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Eventbook Server - event planning backend
#[derive(Parser)]
#[command(name = "eventbook-server")]
#[command(about = "Eventbook Server - event planning backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory store regardless of configuration
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config {
        if !path.is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.mock {
        config.store.path = None;
    }

    init_logging(&config, cli.verbose);
    tracing::info!("Eventbook Server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_pretty_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn init_logging(config: &AppConfig, verbose: u8) {
    let default_filter = match verbose {
        0 => config.logging.filter.clone(),
        1 => "debug".to_owned(),
        _ => "trace".to_owned(),
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn check_config(config: &AppConfig) -> Result<()> {
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    let store = match &config.store.path {
        Some(path) => {
            DocStore::open(path).with_context(|| format!("opening store at {}", path.display()))?
        }
        None => {
            tracing::info!("no store path configured, using in-memory store");
            DocStore::in_memory()
        }
    };

    let users = Arc::new(DocUsersRepository::new(&store));
    let events = Arc::new(DocEventsRepository::new(&store));

    let forecast: Arc<dyn ForecastProvider> = if config.weather.enabled {
        Arc::new(OpenMeteoClient::new(config.weather.base_url.clone()))
    } else {
        tracing::warn!("weather integration disabled by configuration");
        Arc::new(DisabledForecast)
    };

    let service = Arc::new(Service::new(
        users,
        events,
        forecast,
        ServiceConfig::default(),
    ));
    let tokens = Arc::new(TokenIssuer::new(&AuthConfig {
        secret: config.auth.secret.clone(),
        token_ttl_minutes: config.auth.token_ttl_minutes,
    }));

    Ok(AppState::new(service, tokens))
}

async fn run_server(config: AppConfig) -> Result<()> {
    let state = build_state(&config)?;
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
