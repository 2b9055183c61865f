use clap::Parser;
use repo_finder::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::{presets::PresetCatalog, Settings},
    Error, Result,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,repo_finder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Search(args) => {
            commands::search(&settings, args).await?;
        }
        Commands::Presets => {
            let catalog = PresetCatalog::load(settings.presets_path.as_deref())?;
            commands::list_presets(&catalog, settings.search.default_page_size);
        }
        Commands::Periods => {
            commands::list_time_periods();
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Repo Finder server");
    info!("Server: {}:{}", settings.server.host, settings.server.port);
    info!(
        "GitHub API: {} ({})",
        settings.github.api_base_url(),
        if settings.github.has_token() {
            "authenticated"
        } else {
            "unauthenticated"
        }
    );

    let state = AppState::new(settings.clone())?;
    info!("Loaded {} search presets", state.presets.len());

    let app = routes::create_router(state, &settings);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Repo Finder Server");
    println!("========================================");
    println!("Address: http://{addr}");
    println!("\nAPI Endpoints:");
    println!("  GET  /api/presets");
    println!("  GET  /api/time-periods");
    println!("  POST /api/search");
    println!("  POST /api/export/json");
    println!("  POST /api/export/csv");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}
