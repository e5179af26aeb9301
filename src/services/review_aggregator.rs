use serde_json::Value;

use crate::{
    error::AppResult,
    services::{
        embedding::{embed_texts, TextEmbedder},
        vector,
    },
};

/// Reviews at or below this many characters (after trimming) carry no opinion
const MIN_REVIEW_CHARS: usize = 10;

/// Returns the trimmed text of every review long enough to embed
///
/// Non-string entries are skipped.
pub fn qualifying_reviews(reviews: &[Value]) -> Vec<String> {
    reviews
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|text| text.chars().count() > MIN_REVIEW_CHARS)
        .map(str::to_string)
        .collect()
}

/// Builds a course's review aggregate: the mean embedding of its qualifying
/// reviews, or `None` when no review qualifies.
pub async fn aggregate_reviews(
    embedder: &dyn TextEmbedder,
    reviews: &[Value],
) -> AppResult<Option<Vec<f32>>> {
    let texts = qualifying_reviews(reviews);
    if texts.is_empty() {
        return Ok(None);
    }

    let embeddings = embed_texts(embedder, &texts).await?;
    vector::mean(&embeddings, embedder.dimensions()).map(Some)
}
