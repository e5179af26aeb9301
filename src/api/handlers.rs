use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Recommendation, RecommendationRequest},
    services::pdf::{extract_pdf_text, is_pdf_file_name, NOT_A_PDF},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub courses: usize,
    pub courses_with_reviews: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CourseCodesResponse {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendFromCoursesResponse {
    Success {
        completed_courses: Value,
        recommendations: Vec<Recommendation>,
        total_recommendations: usize,
    },
    Failure {
        error: String,
        recommendations: Vec<Recommendation>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ExtractCoursesRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractCoursesResponse {
    pub status: &'static str,
    pub extracted_courses: Vec<String>,
    pub course_codes: Vec<String>,
    pub course_numbers: Vec<String>,
    pub raw_text_length: usize,
    pub recommendations: Vec<Recommendation>,
    pub total_courses_found: usize,
    pub total_recommendations: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadPdfResponse {
    pub filename: String,
    pub size: usize,
    pub message: &'static str,
    #[serde(flatten)]
    pub transcript: ExtractCoursesResponse,
}

// Handlers

/// Health check endpoint, reporting the loaded catalog
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.recommender.catalog();
    Json(HealthResponse {
        status: "healthy",
        courses: catalog.len(),
        courses_with_reviews: catalog.review_count(),
        loaded_at: catalog.loaded_at(),
    })
}

/// Recommend courses, returning only their codes
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> Json<CourseCodesResponse> {
    tracing::info!(
        request_id = %request_id,
        completed_count = request.completed_courses.len(),
        "Processing recommendation request"
    );

    let response = state.recommender.recommend(&request);

    Json(CourseCodesResponse {
        recommendations: response.course_codes(),
    })
}

/// Recommend courses with scores and course details
///
/// Accepts any JSON body so malformed requests come back as an `error`
/// field rather than a rejection.
pub async fn recommend_from_courses(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<Value>,
) -> Json<RecommendFromCoursesResponse> {
    tracing::info!(request_id = %request_id, "Processing detailed recommendation request");

    let completed_courses = payload
        .get("completed_courses")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let response = state.recommender.recommend_value(payload);

    let body = match response.error {
        Some(error) => RecommendFromCoursesResponse::Failure {
            error,
            recommendations: Vec::new(),
        },
        None => RecommendFromCoursesResponse::Success {
            completed_courses,
            total_recommendations: response.recommendations.len(),
            recommendations: response.recommendations,
        },
    };

    Json(body)
}

/// Extract completed courses from transcript text and recommend from them
pub async fn extract_courses(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ExtractCoursesRequest>,
) -> Json<ExtractCoursesResponse> {
    Json(recommend_from_transcript(&state, request_id, &request.text))
}

/// Extract completed courses from an uploaded transcript PDF and recommend
/// from them
///
/// Expects a multipart form with the document in a `file` field.
pub async fn upload_pdf(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadPdfResponse>> {
    let (filename, contents) = read_file_field(&mut multipart).await?;

    if !is_pdf_file_name(&filename) {
        tracing::warn!(request_id = %request_id, filename = %filename, "Rejected non-PDF upload");
        return Err(AppError::InvalidInput(NOT_A_PDF.to_string()));
    }

    let size = contents.len();
    let text = extract_pdf_text(contents.to_vec()).await.map_err(|e| {
        tracing::warn!(request_id = %request_id, filename = %filename, error = %e, "PDF extraction failed");
        e
    })?;

    Ok(Json(UploadPdfResponse {
        filename,
        size,
        message: "PDF processed successfully",
        transcript: recommend_from_transcript(&state, request_id, &text),
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> AppResult<(String, Bytes)> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::InvalidInput(format!("invalid multipart body: {}", e))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await.map_err(invalid)?;
        return Ok((filename, contents));
    }

    Err(AppError::InvalidInput("missing file field".to_string()))
}

fn recommend_from_transcript(
    state: &AppState,
    request_id: RequestId,
    text: &str,
) -> ExtractCoursesResponse {
    let extracted = state.scraper.extract(text);

    tracing::info!(
        request_id = %request_id,
        text_length = text.len(),
        courses_found = extracted.full_courses.len(),
        "Extracted courses from transcript"
    );

    let recommendations = if extracted.full_courses.is_empty() {
        Vec::new()
    } else {
        let response = state.recommender.recommend(&RecommendationRequest {
            completed_courses: extracted.full_courses.clone(),
        });
        // A failed recommendation still returns the extracted courses
        response.recommendations
    };

    ExtractCoursesResponse {
        status: "processed",
        total_courses_found: extracted.full_courses.len(),
        total_recommendations: recommendations.len(),
        extracted_courses: extracted.full_courses,
        course_codes: extracted.course_codes,
        course_numbers: extracted.course_numbers,
        raw_text_length: text.chars().count(),
        recommendations,
    }
}
