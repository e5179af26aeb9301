//! Candidate scoring and top-K selection.
//!
//! Every catalog course outside the completed set is scored against the
//! student's profiles, gated on its review metrics, blended into a composite
//! score and ranked:
//!
//! ```text
//! score = 0.25 * content_similarity
//!       + 0.25 * review_similarity
//!       + 0.15 * liked / 100
//!       + 0.10 * useful / 100
//!       + 0.25 * easy / 100
//! ```
//!
//! Absent (or zero) metrics fall back to liked = 0, useful = 50, easy = 50.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{
    catalog::Catalog,
    error::AppResult,
    models::{CourseRecord, Percentage, Recommendation},
    services::{profile::StudentProfile, vector},
};

/// Maximum number of courses returned per request
pub const MAX_RECOMMENDATIONS: usize = 5;

const DEFAULT_LIKED: f64 = 0.0;
const DEFAULT_USEFUL: f64 = 50.0;
const DEFAULT_EASY: f64 = 50.0;

const MIN_LIKED: f64 = 70.0;
const MIN_EASY: f64 = 60.0;
const MAX_EASY: f64 = 100.0;

/// Composite score weights; they sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub content_similarity: f64,
    pub review_similarity: f64,
    pub liked: f64,
    pub useful: f64,
    pub easy: f64,
}

pub const WEIGHTS: ScoringWeights = ScoringWeights {
    content_similarity: 0.25,
    review_similarity: 0.25,
    liked: 0.15,
    useful: 0.10,
    easy: 0.25,
};

/// Review metrics of a course with defaults applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseMetrics {
    pub liked: f64,
    pub useful: f64,
    pub easy: f64,
}

impl CourseMetrics {
    pub fn of(course: &CourseRecord) -> Self {
        let info = &course.info;
        Self {
            liked: Percentage::or_default(info.liked_percentage, DEFAULT_LIKED),
            useful: Percentage::or_default(info.useful_percentage, DEFAULT_USEFUL),
            easy: Percentage::or_default(info.easy_percentage, DEFAULT_EASY),
        }
    }

    /// Hard gate: well liked and not too hard
    pub fn is_eligible(&self) -> bool {
        self.liked >= MIN_LIKED && (MIN_EASY..=MAX_EASY).contains(&self.easy)
    }
}

/// A scored candidate, with the similarity terms that went into its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub course: &'a CourseRecord,
    pub content_score: f64,
    pub review_score: f64,
    pub score: f64,
}

impl ScoredCandidate<'_> {
    pub fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            course_code: self.course.code.clone(),
            score: self.score,
            course_info: self.course.info.clone(),
        }
    }
}

/// Blends similarity terms and metrics into the composite score
pub fn composite_score(
    weights: &ScoringWeights,
    content_score: f64,
    review_score: f64,
    metrics: &CourseMetrics,
) -> f64 {
    weights.content_similarity * content_score
        + weights.review_similarity * review_score
        + weights.liked * (metrics.liked / 100.0)
        + weights.useful * (metrics.useful / 100.0)
        + weights.easy * (metrics.easy / 100.0)
}

/// Scores, filters and ranks every catalog course not in `completed`
///
/// Returns at most `limit` candidates, best first. Equal scores keep catalog
/// insertion order.
pub fn rank_candidates<'a>(
    catalog: &'a Catalog,
    profile: &StudentProfile,
    completed: &[String],
    limit: usize,
) -> AppResult<Vec<ScoredCandidate<'a>>> {
    let completed: HashSet<&str> = completed.iter().map(String::as_str).collect();
    let mut candidates = Vec::new();

    for course in catalog.courses() {
        if completed.contains(course.code.as_str()) {
            continue;
        }

        let content_score = vector::cosine_similarity(&course.embedding, &profile.content)?;
        let review_score = match (&profile.review, &course.review_embedding) {
            (Some(review_profile), Some(course_reviews)) => {
                vector::cosine_similarity(course_reviews, review_profile)?
            }
            _ => 0.0,
        };

        let metrics = CourseMetrics::of(course);
        if !metrics.is_eligible() {
            continue;
        }

        candidates.push(ScoredCandidate {
            course,
            content_score,
            review_score,
            score: composite_score(&WEIGHTS, content_score, review_score, &metrics),
        });
    }

    // sort_by is stable, so ties stay in catalog order
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(limit);

    tracing::debug!(
        returned = candidates.len(),
        catalog_size = catalog.len(),
        "Ranked candidates"
    );

    Ok(candidates)
}
