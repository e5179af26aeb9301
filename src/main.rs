use std::sync::Arc;

use anyhow::Context;
use course_recommender::{
    api::{cors_layer, create_router, AppState},
    catalog::load_catalog,
    config::Config,
    services::embedding::{OpenAiEmbedder, TextEmbedder},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let client = OpenAiEmbedder::new(
        &config.embedding_api_url,
        config.embedding_api_key.as_deref(),
        config.embedding_model.clone(),
        config.embedding_dimensions,
        config.embedding_batch_size,
        config.embedding_timeout(),
    )
    .context("Failed to create embedding client")?;
    tracing::info!(
        model = client.model(),
        dimensions = config.embedding_dimensions,
        "Embedding client ready"
    );
    let embedder: Arc<dyn TextEmbedder> = Arc::new(client);

    // The catalog must be fully loaded before any request is accepted
    let (catalog, _) = load_catalog(&config.catalog_path, embedder, config.embedding_concurrency)
        .await
        .with_context(|| format!("Failed to load course catalog from {}", config.catalog_path))?;

    let state = AppState::new(Arc::new(catalog))?;
    let app = create_router(state).layer(cors_layer(&config.cors_origin)?);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
