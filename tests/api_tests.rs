use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use course_recommender::{
    api::{create_router, AppState},
    catalog::{load_catalog_from_str, Catalog},
    error::AppResult,
    models::RecommendationRequest,
    services::{embedding::TextEmbedder, RecommendationService},
};

const DIM: usize = 4;

/// Deterministic embedder: reviews about theory point one way, reviews about
/// projects another, everything else a third
struct KeywordEmbedder;

#[async_trait::async_trait]
impl TextEmbedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                if text.contains("theory") {
                    vec![0.0, 0.0, 1.0, 0.0]
                } else if text.contains("project") {
                    vec![0.0, 0.0, 0.0, 1.0]
                } else {
                    vec![0.0, 1.0, 0.0, 0.0]
                }
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn batch_size(&self) -> usize {
        8
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

async fn load(entries: Value) -> Arc<Catalog> {
    let (catalog, _) = load_catalog_from_str(&entries.to_string(), Arc::new(KeywordEmbedder), 2)
        .await
        .unwrap();
    Arc::new(catalog)
}

fn fixture_entries() -> Value {
    json!({
        "CS101": {
            "embedding": [1.0, 0.0, 0.0, 0.0],
            "url": "https://example.edu/cs101",
            "liked_percentage": 90, "easy_percentage": 80, "useful_percentage": 70,
            "course_description": "Introduction to programming",
            "reviews": ["Lots of theory and proofs every week"]
        },
        "CS102": {
            "embedding": [0.8, 0.6, 0.0, 0.0],
            "liked_percentage": 75, "easy_percentage": 65,
            "reviews": ["The final project was the best part", "ok"]
        },
        "MATH2B": {
            "embedding": [0.0, 1.0, 0.0, 0.0],
            "liked_percentage": 72, "easy_percentage": 60, "useful_percentage": null
        },
        "PHYS7C": {
            "embedding": [0.0, 0.0, 1.0, 0.0],
            "liked_percentage": 95, "easy_percentage": 100,
            "reviews": ["short"]
        },
        "BIO1": {
            "embedding": [0.5, 0.5, 0.5, 0.5],
            "easy_percentage": 90
        },
        "ECON20": {
            "embedding": [0.2, 0.1, 0.9, 0.3],
            "liked_percentage": 85, "easy_percentage": 55
        },
        "ART5": {
            "embedding": [0.1, 0.9, 0.1, 0.0],
            "liked_percentage": 70
        },
        "HIST10": {
            "embedding": [0.3, 0.3, 0.3, 0.8],
            "liked_percentage": 88, "easy_percentage": 0
        },
        "CHEM1": {
            "embedding": [0.6, 0.2, 0.1, 0.7],
            "liked_percentage": 80, "easy_percentage": 75, "useful_percentage": 0,
            "reviews": ["Weekly lab project reports", "Heavy on reaction theory"]
        },
        "ENG9": {
            "embedding": [0.4, 0.4, 0.4, 0.4],
            "liked_percentage": 71, "easy_percentage": 61
        },
        "NOEMB1": {
            "url": "https://example.edu/noemb1",
            "liked_percentage": 99, "easy_percentage": 99
        }
    })
}

async fn fixture_service() -> RecommendationService {
    RecommendationService::new(load(fixture_entries()).await)
}

async fn create_test_app(entries: Value) -> Router {
    let state = AppState::new(load(entries).await).unwrap();
    create_router(state)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

fn request(codes: &[&str]) -> RecommendationRequest {
    RecommendationRequest {
        completed_courses: codes.iter().map(|c| c.to_string()).collect(),
    }
}

fn passes_gate(info: &Value) -> bool {
    let liked = info["liked_percentage"].as_f64().unwrap_or(0.0);
    let easy = match info["easy_percentage"].as_f64() {
        Some(easy) if easy != 0.0 => easy,
        _ => 50.0,
    };
    liked >= 70.0 && (60.0..=100.0).contains(&easy)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["courses"], 10);
    assert_eq!(body["courses_with_reviews"], 3);
}

#[tokio::test]
async fn test_scenario_a_composite_score() {
    let app = create_test_app(json!({
        "CS101": {"embedding": [1.0, 0.0, 0.0, 0.0]},
        "CS201": {
            "embedding": [0.9, 0.435_889_9, 0.0, 0.0],
            "liked_percentage": 80, "easy_percentage": 70, "useful_percentage": 60
        }
    }))
    .await;

    let (status, _, body) = send(
        app,
        Method::POST,
        "/recommend-from-courses",
        Some(json!({"completed_courses": ["cs101"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["completed_courses"], json!(["cs101"]));
    assert_eq!(body["total_recommendations"], 1);

    let rec = &body["recommendations"][0];
    assert_eq!(rec["course_code"], "CS201");
    let score = rec["score"].as_f64().unwrap();
    assert!((score - 0.58).abs() < 1e-6, "score was {}", score);
    assert_eq!(rec["course_info"]["liked_percentage"], 80.0);
    assert_eq!(rec["course_info"]["reviews"], json!([]));
}

#[tokio::test]
async fn test_scenario_b_no_valid_courses() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(
        app,
        Method::POST,
        "/recommend-from-courses",
        Some(json!({"completed_courses": ["zzzz999"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "No valid completed courses found", "recommendations": []})
    );

    let service = fixture_service().await;
    let response = service.recommend(&request(&["zzzz999"]));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"recommendations": [], "error": "No valid completed courses found"})
    );
}

#[tokio::test]
async fn test_scenario_c_absent_liked_is_never_recommended() {
    let service = RecommendationService::new(
        load(json!({
            "BASE1": {"embedding": [1.0, 0.0, 0.0, 0.0]},
            "TWIN1": {"embedding": [1.0, 0.0, 0.0, 0.0], "easy_percentage": 100, "useful_percentage": 100},
            "OTHER1": {"embedding": [0.0, 1.0, 0.0, 0.0], "liked_percentage": 70, "easy_percentage": 60}
        }))
        .await,
    );

    let response = service.recommend(&request(&["BASE1"]));
    assert_eq!(response.course_codes(), vec!["OTHER1"]);
}

#[tokio::test]
async fn test_scenario_d_ties_follow_catalog_order() {
    let service = RecommendationService::new(
        load(json!({
            "BASE1": {"embedding": [1.0, 0.0, 0.0, 0.0]},
            "ZETA1": {"embedding": [0.0, 1.0, 0.0, 0.0], "liked_percentage": 80, "easy_percentage": 70},
            "MIDDLE1": {"embedding": [0.0, 0.0, 1.0, 0.0], "liked_percentage": 80, "easy_percentage": 70},
            "ALPHA1": {"embedding": [0.0, 0.0, 0.0, 1.0], "liked_percentage": 80, "easy_percentage": 70}
        }))
        .await,
    );

    let response = service.recommend(&request(&["base1"]));
    assert_eq!(response.course_codes(), vec!["ZETA1", "MIDDLE1", "ALPHA1"]);
    let scores: Vec<f64> = response.recommendations.iter().map(|r| r.score).collect();
    assert!(scores.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_every_completed_subset_respects_exclusion_limit_and_gates() {
    let service = fixture_service().await;
    let codes: Vec<String> = service
        .catalog()
        .courses()
        .iter()
        .map(|c| c.code.clone())
        .collect();

    for mask in 1u32..(1 << codes.len()) {
        let completed: Vec<String> = codes
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| c.clone())
            .collect();

        let response = service.recommend(&RecommendationRequest {
            completed_courses: completed.clone(),
        });

        assert!(!response.is_error(), "subset {:?} failed", completed);
        assert!(response.recommendations.len() <= 5);

        for rec in &response.recommendations {
            assert!(!completed.contains(&rec.course_code));
            let info = serde_json::to_value(&rec.course_info).unwrap();
            assert!(passes_gate(&info), "{} passed the gate", rec.course_code);
        }

        assert!(response
            .recommendations
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }
}

#[tokio::test]
async fn test_ineligible_courses_never_appear() {
    let service = fixture_service().await;
    let response = service.recommend(&request(&["MATH2B"]));

    let codes = response.course_codes();
    assert_eq!(codes.len(), 5);
    for excluded in ["BIO1", "ECON20", "ART5", "HIST10", "NOEMB1"] {
        assert!(!codes.contains(&excluded.to_string()));
    }
}

#[tokio::test]
async fn test_recommendations_are_idempotent() {
    let service = fixture_service().await;
    let first = service.recommend(&request(&["CS101", "PHYS7C"]));
    let second = service.recommend(&request(&["cs101", "phys7c"]));
    assert_eq!(first, second);
    assert!(!first.recommendations.is_empty());
}

#[tokio::test]
async fn test_review_similarity_breaks_content_ties() {
    let service = RecommendationService::new(
        load(json!({
            "BASE1": {
                "embedding": [1.0, 0.0, 0.0, 0.0],
                "reviews": ["So much theory in the lectures"]
            },
            "PROJ1": {
                "embedding": [0.0, 1.0, 0.0, 0.0],
                "liked_percentage": 80, "easy_percentage": 70,
                "reviews": ["Group project carried the grade"]
            },
            "THRY1": {
                "embedding": [0.0, 1.0, 0.0, 0.0],
                "liked_percentage": 80, "easy_percentage": 70,
                "reviews": ["Dense theory but rewarding"]
            }
        }))
        .await,
    );

    let response = service.recommend(&request(&["BASE1"]));
    assert_eq!(response.course_codes(), vec!["THRY1", "PROJ1"]);
    let gap = response.recommendations[0].score - response.recommendations[1].score;
    assert!((gap - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_recommend_returns_codes_only() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(
        app,
        Method::POST,
        "/recommend",
        Some(json!({"completed_courses": ["cs101"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let codes = body["recommendations"].as_array().unwrap();
    assert!(!codes.is_empty() && codes.len() <= 5);
    assert!(codes.iter().all(Value::is_string));
    assert!(!codes.contains(&json!("CS101")));
}

#[tokio::test]
async fn test_recommend_with_unknown_courses_returns_empty_list() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(
        app,
        Method::POST,
        "/recommend",
        Some(json!({"completed_courses": ["NOPE1"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"recommendations": []}));
}

#[tokio::test]
async fn test_malformed_request_is_reported_as_error() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(
        app,
        Method::POST,
        "/recommend-from-courses",
        Some(json!({"completed_courses": "CS101"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], json!([]));
    assert!(body["error"].as_str().unwrap().contains("list of strings"));
}

#[tokio::test]
async fn test_extract_courses_from_transcript_text() {
    let app = create_test_app(fixture_entries()).await;
    let text = "Spring 2024\nCourse\nCS\n101\nDescription\nIntro\nGrade\nA\nCourse\nMATH\n2B\nDescription\nCalculus\n";
    let (status, _, body) = send(
        app,
        Method::POST,
        "/extract-courses",
        Some(json!({ "text": text })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");
    assert_eq!(body["extracted_courses"], json!(["CS101", "MATH2B"]));
    assert_eq!(body["course_codes"], json!(["CS", "MATH"]));
    assert_eq!(body["course_numbers"], json!(["101", "2B"]));
    assert_eq!(body["total_courses_found"], 2);
    assert_eq!(body["raw_text_length"], text.chars().count());

    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(body["total_recommendations"], recs.len());
    assert!(recs
        .iter()
        .all(|r| r["course_code"] != "CS101" && r["course_code"] != "MATH2B"));
}

#[tokio::test]
async fn test_extract_courses_without_matches() {
    let app = create_test_app(fixture_entries()).await;
    let (status, _, body) = send(
        app,
        Method::POST,
        "/extract-courses",
        Some(json!({"text": "No course blocks here"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted_courses"], json!([]));
    assert_eq!(body["recommendations"], json!([]));
    assert_eq!(body["total_recommendations"], 0);
}

const BOUNDARY: &str = "transcript-upload-boundary";

/// Posts a single-file multipart form to `/upload-pdf`
async fn upload(app: Router, filename: &str, contents: &[u8]) -> (StatusCode, Value) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-pdf")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_upload_pdf_rejects_other_file_types() {
    let app = create_test_app(fixture_entries()).await;
    let (status, body) = upload(app, "transcript.txt", b"Course\nCS\n101\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "File must be a PDF"}));
}

#[tokio::test]
async fn test_upload_pdf_reports_unreadable_documents() {
    let app = create_test_app(fixture_entries()).await;
    let (status, body) = upload(app, "transcript.pdf", b"definitely not a pdf").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error processing PDF: "), "{error}");
    assert!(body.get("recommendations").is_none());
}

#[tokio::test]
async fn test_upload_pdf_requires_file_field() {
    let app = create_test_app(fixture_entries()).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-pdf")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_header_is_echoed() {
    let app = create_test_app(fixture_entries()).await;
    let request_id = "3f8a2c4e-9b1d-4e7a-8c6f-2d5b7e9a1c3f";
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("x-request-id", request_id)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], request_id);

    let app = create_test_app(fixture_entries()).await;
    let (_, headers, _) = send(app, Method::GET, "/health", None).await;
    assert!(headers.contains_key("x-request-id"));
}
