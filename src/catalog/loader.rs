//! Catalog artifact loader
//!
//! Reads the precomputed `code -> course` JSON object, drops entries that
//! cannot be scored, and embeds each remaining course's reviews once. Any
//! fault here is fatal to startup.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use super::Catalog;
use crate::{
    error::{AppError, AppResult},
    models::{normalize_course_code, CourseInfo, CourseRecord, Percentage},
    services::{embedding::TextEmbedder, review_aggregator::aggregate_reviews, vector},
};

/// One entry of the catalog artifact as stored on disk
#[derive(Debug, Deserialize)]
struct RawCourse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    useful_percentage: Option<Value>,
    #[serde(default)]
    easy_percentage: Option<Value>,
    #[serde(default)]
    liked_percentage: Option<Value>,
    #[serde(default)]
    course_description: Option<String>,
    #[serde(default)]
    reviews: Option<Vec<Value>>,
}

/// Counters reported after a catalog load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub entries: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub with_reviews: usize,
}

/// A scorable course whose review aggregate has not been computed yet
struct PendingCourse {
    code: String,
    embedding: Vec<f32>,
    info: CourseInfo,
}

/// Loads the catalog artifact at `path`
pub async fn load_catalog(
    path: impl AsRef<Path>,
    embedder: Arc<dyn TextEmbedder>,
    concurrency: usize,
) -> AppResult<(Catalog, LoadStats)> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::CatalogLoad(format!("failed to read {}: {}", path.display(), e))
    })?;

    load_catalog_from_str(&contents, embedder, concurrency).await
}

/// Loads a catalog from the artifact's JSON text
pub async fn load_catalog_from_str(
    json: &str,
    embedder: Arc<dyn TextEmbedder>,
    concurrency: usize,
) -> AppResult<(Catalog, LoadStats)> {
    let start = Instant::now();
    let dimensions = embedder.dimensions();

    let root: Value = serde_json::from_str(json)
        .map_err(|e| AppError::CatalogLoad(format!("catalog is not valid JSON: {}", e)))?;
    let Value::Object(entries) = root else {
        return Err(AppError::CatalogLoad(
            "catalog must be a JSON object keyed by course code".to_string(),
        ));
    };

    let (pending, mut stats) = parse_entries(entries, dimensions);

    let review_embeddings =
        embed_reviews(&pending, embedder.clone(), concurrency.max(1)).await?;

    let records: Vec<CourseRecord> = pending
        .into_iter()
        .zip(review_embeddings)
        .map(|(course, review_embedding)| CourseRecord {
            code: course.code,
            embedding: course.embedding,
            info: course.info,
            review_embedding,
        })
        .collect();

    let catalog = Catalog::from_records(records, dimensions)?;
    if catalog.is_empty() {
        return Err(AppError::CatalogLoad(
            "catalog contains no courses with embeddings".to_string(),
        ));
    }

    stats.with_reviews = catalog.review_count();

    tracing::info!(
        entries = stats.entries,
        loaded = stats.loaded,
        skipped = stats.skipped,
        with_reviews = stats.with_reviews,
        embedder = embedder.name(),
        elapsed_ms = start.elapsed().as_millis(),
        "Course catalog loaded"
    );

    Ok((catalog, stats))
}

/// Keeps entries with a usable content embedding, in artifact order
fn parse_entries(entries: Map<String, Value>, dimensions: usize) -> (Vec<PendingCourse>, LoadStats) {
    let mut stats = LoadStats {
        entries: entries.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut pending = Vec::new();

    for (key, value) in entries {
        let code = normalize_course_code(&key);

        let raw: RawCourse = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(course = %code, error = %e, "Skipping malformed catalog entry");
                stats.skipped += 1;
                continue;
            }
        };

        let embedding = match raw.embedding {
            Some(embedding) if embedding.len() == dimensions && vector::is_finite(&embedding) => {
                embedding
            }
            Some(embedding) if embedding.len() == dimensions => {
                tracing::warn!(course = %code, "Skipping course with non-finite embedding");
                stats.skipped += 1;
                continue;
            }
            Some(embedding) if !embedding.is_empty() => {
                tracing::warn!(
                    course = %code,
                    expected = dimensions,
                    actual = embedding.len(),
                    "Skipping course with wrong embedding dimension"
                );
                stats.skipped += 1;
                continue;
            }
            _ => {
                tracing::debug!(course = %code, "Skipping course without embedding");
                stats.skipped += 1;
                continue;
            }
        };

        if !seen.insert(code.clone()) {
            tracing::warn!(course = %code, "Skipping duplicate course code");
            stats.skipped += 1;
            continue;
        }

        let info = CourseInfo {
            url: raw.url.unwrap_or_default(),
            useful_percentage: parse_percentage(&code, "useful_percentage", raw.useful_percentage),
            easy_percentage: parse_percentage(&code, "easy_percentage", raw.easy_percentage),
            liked_percentage: parse_percentage(&code, "liked_percentage", raw.liked_percentage),
            course_description: raw.course_description.unwrap_or_default(),
            reviews: raw.reviews.unwrap_or_default(),
        };

        pending.push(PendingCourse {
            code,
            embedding,
            info,
        });
        stats.loaded += 1;
    }

    (pending, stats)
}

/// Reads an optional percentage field; anything but an in-range number is absent
fn parse_percentage(code: &str, field: &str, value: Option<Value>) -> Option<Percentage> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_f64().and_then(Percentage::new);
            if parsed.is_none() {
                tracing::warn!(
                    course = %code,
                    field,
                    value = %value,
                    "Ignoring invalid percentage"
                );
            }
            parsed
        }
    }
}

/// Computes every course's review aggregate, at most `concurrency` at a time,
/// returning results in the same order as `courses`
async fn embed_reviews(
    courses: &[PendingCourse],
    embedder: Arc<dyn TextEmbedder>,
    concurrency: usize,
) -> AppResult<Vec<Option<Vec<f32>>>> {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = Vec::with_capacity(courses.len());

    for course in courses {
        let reviews = course.info.reviews.clone();
        let embedder = embedder.clone();
        let semaphore = semaphore.clone();
        let task = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            aggregate_reviews(embedder.as_ref(), &reviews).await
        });
        tasks.push((course.code.as_str(), task));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (code, task) in tasks {
        let aggregate = task
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::CatalogLoad(format!("reviews for {}: {}", code, e)))?;
        results.push(aggregate);
    }

    Ok(results)
}
