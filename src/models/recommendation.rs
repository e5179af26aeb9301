use serde::{Deserialize, Serialize};

use super::CourseInfo;
use crate::error::AppError;

/// Request to recommend courses from a list of completed ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub completed_courses: Vec<String>,
}

/// A single recommended course with its composite score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub course_code: String,
    pub score: f64,
    pub course_info: CourseInfo,
}

/// Result of a recommendation request
///
/// Always well formed: `error` is present only on failure, in which case
/// `recommendations` is empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationResponse {
    pub fn success(recommendations: Vec<Recommendation>) -> Self {
        Self {
            recommendations,
            error: None,
        }
    }

    pub fn failure(error: &AppError) -> Self {
        Self {
            recommendations: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn course_codes(&self) -> Vec<String> {
        self.recommendations
            .iter()
            .map(|r| r.course_code.clone())
            .collect()
    }
}
