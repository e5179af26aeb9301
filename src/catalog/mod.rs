//! In-memory course embedding catalog.
//!
//! Built once at startup and shared read-only (`Arc<Catalog>`) by every
//! request. Course order is the artifact's insertion order and is what the
//! ranker falls back on to break score ties.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{normalize_course_code, CourseRecord},
    services::vector,
};

pub mod loader;

pub use loader::{load_catalog, load_catalog_from_str, LoadStats};

#[derive(Debug)]
pub struct Catalog {
    courses: Vec<CourseRecord>,
    index: HashMap<String, usize>,
    dimensions: usize,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Builds a catalog from already-embedded records, keeping their order
    ///
    /// Every content embedding and review aggregate must have `dimensions`
    /// finite components, and course codes must be unique once normalized.
    pub fn from_records(records: Vec<CourseRecord>, dimensions: usize) -> AppResult<Self> {
        let mut courses = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for mut record in records {
            record.code = normalize_course_code(&record.code);

            vector::ensure_dim(&record.embedding, dimensions).map_err(|e| {
                AppError::CatalogLoad(format!("course {}: {}", record.code, e))
            })?;
            if let Some(review_embedding) = &record.review_embedding {
                vector::ensure_dim(review_embedding, dimensions).map_err(|e| {
                    AppError::CatalogLoad(format!("course {} reviews: {}", record.code, e))
                })?;
            }
            let review_finite = record
                .review_embedding
                .as_deref()
                .map_or(true, vector::is_finite);
            if !vector::is_finite(&record.embedding) || !review_finite {
                return Err(AppError::CatalogLoad(format!(
                    "course {} has a non-finite embedding",
                    record.code
                )));
            }

            if index.contains_key(&record.code) {
                return Err(AppError::CatalogLoad(format!(
                    "duplicate course code {}",
                    record.code
                )));
            }

            index.insert(record.code.clone(), courses.len());
            courses.push(record);
        }

        Ok(Self {
            courses,
            index,
            dimensions,
            loaded_at: Utc::now(),
        })
    }

    /// Looks up a course by its normalized code
    pub fn get(&self, code: &str) -> Option<&CourseRecord> {
        self.index.get(code).map(|&i| &self.courses[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// All scorable courses in insertion order
    pub fn courses(&self) -> &[CourseRecord] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of courses carrying a review aggregate
    pub fn review_count(&self) -> usize {
        self.courses
            .iter()
            .filter(|c| c.review_embedding.is_some())
            .count()
    }
}
