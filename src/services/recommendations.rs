use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    models::{normalize_course_code, RecommendationRequest, RecommendationResponse},
    services::{
        profile::build_profile,
        ranker::{rank_candidates, MAX_RECOMMENDATIONS},
    },
};

/// Recommends courses from a student's completed courses
///
/// The only entry point the API layer calls. Holds the shared catalog and no
/// other state, so one instance serves any number of concurrent requests.
/// Per-request faults never escape: they come back as a response carrying
/// an `error` and no recommendations.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    catalog: Arc<Catalog>,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Recommends courses for an untyped JSON request
    ///
    /// Rejects payloads that are not `{"completed_courses": [string, ...]}`.
    pub fn recommend_value(&self, request: Value) -> RecommendationResponse {
        match parse_request(request) {
            Ok(request) => self.recommend(&request),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed recommendation request");
                RecommendationResponse::failure(&e)
            }
        }
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> RecommendationResponse {
        let start = Instant::now();

        match self.try_recommend(request) {
            Ok(response) => {
                tracing::info!(
                    requested = request.completed_courses.len(),
                    returned = response.recommendations.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Recommendations generated"
                );
                response
            }
            Err(e) => {
                tracing::warn!(
                    requested = request.completed_courses.len(),
                    error = %e,
                    "Recommendation request failed"
                );
                RecommendationResponse::failure(&e)
            }
        }
    }

    fn try_recommend(&self, request: &RecommendationRequest) -> AppResult<RecommendationResponse> {
        let completed = self.valid_completed_courses(&request.completed_courses);
        if completed.is_empty() {
            return Err(AppError::NoValidCourses);
        }

        tracing::debug!(
            valid = completed.len(),
            requested = request.completed_courses.len(),
            "Validated completed courses"
        );

        let profile = build_profile(&self.catalog, &completed)?;
        let ranked = rank_candidates(&self.catalog, &profile, &completed, MAX_RECOMMENDATIONS)?;

        Ok(RecommendationResponse::success(
            ranked.iter().map(|c| c.to_recommendation()).collect(),
        ))
    }

    /// Uppercases the supplied codes and keeps those in the catalog, in order
    fn valid_completed_courses(&self, supplied: &[String]) -> Vec<String> {
        supplied
            .iter()
            .map(|code| normalize_course_code(code))
            .filter(|code| self.catalog.contains(code))
            .collect()
    }
}

fn parse_request(request: Value) -> AppResult<RecommendationRequest> {
    let Value::Object(mut fields) = request else {
        return Err(AppError::InvalidInput(
            "request must be a JSON object".to_string(),
        ));
    };

    // A missing list behaves like an empty one
    let Some(courses) = fields.remove("completed_courses") else {
        return Ok(RecommendationRequest {
            completed_courses: Vec::new(),
        });
    };

    let Value::Array(courses) = courses else {
        return Err(AppError::InvalidInput(
            "completed_courses must be a list of strings".to_string(),
        ));
    };

    let completed_courses = courses
        .into_iter()
        .map(|course| match course {
            Value::String(code) => Ok(code),
            other => Err(AppError::InvalidInput(format!(
                "completed course must be a string, got {}",
                other
            ))),
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(RecommendationRequest { completed_courses })
}
