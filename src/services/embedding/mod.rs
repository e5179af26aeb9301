//! Text embedding abstraction
//!
//! Review texts are embedded once while the catalog loads. The model itself
//! lives behind this trait so the catalog can be built against a remote
//! endpoint in production and a deterministic stub in tests.

use crate::{
    error::{AppError, AppResult},
    services::vector,
};

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Trait for sentence embedding backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Dimension of every vector this embedder produces
    fn dimensions(&self) -> usize;

    /// Largest batch accepted by `embed_batch`
    fn batch_size(&self) -> usize;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Embeds any number of texts, splitting them into backend-sized batches and
/// checking that every returned vector has the expected shape.
pub async fn embed_texts(
    embedder: &dyn TextEmbedder,
    texts: &[String],
) -> AppResult<Vec<Vec<f32>>> {
    let dim = embedder.dimensions();
    let batch_size = embedder.batch_size().max(1);
    let mut embeddings = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size) {
        let batch = embedder.embed_batch(chunk).await?;
        if batch.len() != chunk.len() {
            return Err(AppError::Embedding(format!(
                "{} returned {} embeddings for {} inputs",
                embedder.name(),
                batch.len(),
                chunk.len()
            )));
        }
        for embedding in &batch {
            vector::ensure_dim(embedding, dim)?;
            if !vector::is_finite(embedding) {
                return Err(AppError::Embedding(format!(
                    "{} returned a non-finite embedding",
                    embedder.name()
                )));
            }
        }
        embeddings.extend(batch);
    }

    Ok(embeddings)
}
