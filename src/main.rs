use std::sync::Arc;

use cinepick_api::{
    api::{create_router, AppState},
    config::Config,
    services::{catalog::TmdbProvider, generation::OpenAiGenerator, http_client::create_http_client},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let credential = config.credential();
    if credential.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, every request will use the catalog fallback");
    }

    // One pool shared by both upstream clients
    let http_client = create_http_client(config.http_timeout())?;

    let generator = OpenAiGenerator::new(
        http_client.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    );
    let catalog = TmdbProvider::new(
        http_client,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    );

    let state = AppState::new(Arc::new(generator), Arc::new(catalog), credential);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, model = %config.openai_model, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
