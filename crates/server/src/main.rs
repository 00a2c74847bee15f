mod api;
mod router;
mod state;

use std::sync::Arc;

use pitchsense_llm::EvaluationService;
use tracing::{info, warn};

use crate::state::AppState;

fn load_config() -> pitchsense_core::Config {
    pitchsense_core::config::load_dotenv();
    pitchsense_core::Config::from_env()
}

fn build_state(config: &pitchsense_core::Config) -> AppState {
    match EvaluationService::from_config(&config.llm) {
        Ok(service) => {
            info!("Evaluation service ready (provider: {})", service.provider_name());
            AppState::ready(service)
        }
        Err(e) => {
            warn!("Evaluation service not available: {}; POST /api/evaluate will answer 503", e);
            AppState::unavailable(config.llm.provider.clone(), e.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    let state = Arc::new(build_state(&config));
    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}
