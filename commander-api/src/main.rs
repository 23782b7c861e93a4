//! Commander Chess Web API server.

use commander_api::{router, ApiState, Config};
use commander_core::Game;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let app = router(ApiState::shared(Game::new()));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, "Commander API running");
    axum::serve(listener, app).await?;
    Ok(())
}
