use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medidoc::config::Config;
use medidoc::handlers::router;
use medidoc::services::ChatCompletionsClient;
use medidoc::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medidoc=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting MediDoc document structuring service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!("Completion model: {}", config.llm_model);

    // Ensure the scratch directory exists before the first upload arrives
    std::fs::create_dir_all(&config.upload_dir)?;

    // The completion client is built once and shared read-only across requests
    let client = Arc::new(ChatCompletionsClient::from_config(&config));

    // Determine port from environment (Railway compatibility)
    let port = env::var("PORT")
        .unwrap_or_else(|_| config.server_port.to_string())
        .parse::<u16>()
        .unwrap_or(config.server_port);

    let host = config.server_host.clone();
    let addr = format!("{}:{}", host, port);

    let app = router(AppState::new(config, client));

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
