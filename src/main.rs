use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studypal::api::router;
use studypal::assistant::{AssistantClient, DisabledAssistant, GeminiClient};
use studypal::config::Config;
use studypal::db::init_pool;
use studypal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studypal=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = init_pool(&config.database_url, config.max_connections).await?;

    let assistant: Arc<dyn AssistantClient> = match config.gemini.clone() {
        Some(gemini) => {
            info!("study assistant using {}", gemini.model);
            Arc::new(GeminiClient::new(gemini)?)
        }
        None => {
            warn!("GEMINI_API_KEY is not set; /assistant/chat will answer 503");
            Arc::new(DisabledAssistant)
        }
    };

    let app = router(AppState::new(pool, assistant));

    info!("listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
