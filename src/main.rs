mod config;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalyzerGateway;
use server::create_router;
use services::{GeminiService, GenerationService};

/// Build the generation client once. `None` leaves the gateway permanently unavailable.
fn init_generator(config: &Config) -> Option<Arc<dyn GenerationService>> {
    let Some(api_key) = config.api_key.clone() else {
        log::error!(
            "FATAL: GOOGLE_API_KEY environment variable not found. The AI service cannot start."
        );
        return None;
    };

    match GeminiService::new(api_key, config.model.clone()) {
        Ok(service) => {
            log::info!("✅ Gemini service initialized with model: {}", service.model());
            Some(Arc::new(service) as Arc<dyn GenerationService>)
        }
        Err(e) => {
            log::error!("❌ Failed to configure Gemini client: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger so RUST_LOG from .env applies
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🚀 Starting Food Analyzer Gateway...");

    let config = Config::from_env()?;

    let gateway = Arc::new(AnalyzerGateway::new(
        init_generator(&config),
        config.model.clone(),
    ));
    if gateway.is_ready() {
        log::info!("✅ Analyzer ready (model: {})", gateway.model());
    } else {
        log::warn!("⚠️ Analyzer running without AI service; /api/execute will return 503");
    }

    let app = create_router(gateway);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🌐 Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("❌ Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
