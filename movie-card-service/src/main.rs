use movie_card_service::{LogFormat, Settings, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing in the configured output format
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "movie_card_service=debug,movie_card_parser=debug,tower_http=debug".into()
    });

    match format {
        LogFormat::Pretty => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    info!(model = %settings.llm.model, "Starting movie card service");

    let app = create_app(&settings).await;
    let listener = TcpListener::bind(settings.bind_address()).await?;
    let addr = listener.local_addr()?;

    info!("Server running on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /health                    - Health check");
    info!("  POST /api/v1/recommend          - Generate recommendation cards");
    info!("  GET  /api/v1/recommend/examples - Sample requests");
    info!("  POST /api/v1/recommend/batch    - Batch recommendations");
    info!("  GET  /api/v1/history            - Recent recommendations");

    axum::serve(listener, app).await?;

    Ok(())
}
