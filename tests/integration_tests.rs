//! Integration tests driving the router end to end with an in-process
//! completion backend and synthesized PDF fixtures.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use medidoc::config::Config;
use medidoc::handlers::router;
use medidoc::services::MockBackend;
use medidoc::state::AppState;
use medidoc::testing::pdf_with_pages;

const BOUNDARY: &str = "medidoc-test-boundary";

fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 5002,
        max_file_size_mb: 10,
        upload_dir,
        llm_base_url: "http://127.0.0.1:1".to_string(),
        llm_api_key: "test-key".to_string(),
        llm_model: "solar-pro".to_string(),
        max_prompt_chars: 10_000,
    }
}

/// State with an isolated scratch directory, so tests can assert the
/// cleanup invariant by inspecting the directory afterwards.
fn test_state(backend: Arc<MockBackend>) -> (AppState, TempDir) {
    let scratch_dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(scratch_dir.path().to_path_buf()), backend);
    (state, scratch_dir)
}

fn scratch_entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

fn multipart_body(field_name: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("file", filename, bytes)))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_rejects_non_pdf_filename_without_side_effects() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, scratch_dir) = test_state(backend.clone());

    let response = router(state)
        .oneshot(upload_request("notes.txt", b"plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body, json!({"error": "Only PDF files are allowed"}));

    // No scratch write, no model call
    assert_eq!(scratch_entries(&scratch_dir), 0);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn upload_rejects_missing_file_field() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, scratch_dir) = test_state(backend.clone());

    let body = multipart_body("document", "report.pdf", b"%PDF-1.5");
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body, json!({"error": "No file uploaded"}));
    assert_eq!(scratch_entries(&scratch_dir), 0);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn upload_rejects_empty_file_before_scratch_write() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, scratch_dir) = test_state(backend.clone());

    let response = router(state)
        .oneshot(upload_request("empty.pdf", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(
        body,
        json!({"error": "Invalid file. Please upload a valid PDF."})
    );
    assert_eq!(scratch_entries(&scratch_dir), 0);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn upload_rejects_pdf_without_text_and_cleans_scratch() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, scratch_dir) = test_state(backend.clone());

    let pdf = pdf_with_pages(&[""]);
    let response = router(state)
        .oneshot(upload_request("scan.pdf", &pdf))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body, json!({"error": "No text found in PDF"}));

    // The scratch copy was written and then removed; no model call happened
    assert_eq!(scratch_entries(&scratch_dir), 0);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn upload_happy_path_returns_structured_data() {
    let backend = Arc::new(MockBackend::new(
        r#"{"patient": "Jane Doe", "diagnosis": "flu"}"#,
    ));
    let (state, scratch_dir) = test_state(backend.clone());

    let pdf = pdf_with_pages(&["Patient: Jane Doe", "Diagnosis: flu"]);
    let response = router(state)
        .oneshot(upload_request("report.pdf", &pdf))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["data"],
        json!({"patient": "Jane Doe", "diagnosis": "flu"})
    );
    assert_eq!(body["extracted_text"], json!("Patient: Jane Doe\n\nDiagnosis: flu"));

    assert_eq!(backend.call_count(), 1);
    assert_eq!(scratch_entries(&scratch_dir), 0);
}

#[tokio::test]
async fn upload_accepts_uppercase_pdf_extension() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, scratch_dir) = test_state(backend);

    let pdf = pdf_with_pages(&["Patient: Jane Doe"]);
    let response = router(state)
        .oneshot(upload_request("report.PDF", &pdf))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(scratch_entries(&scratch_dir), 0);
}

#[tokio::test]
async fn upload_wraps_non_json_completion_in_fallback() {
    let backend = Arc::new(MockBackend::new("hello world"));
    let (state, _scratch_dir) = test_state(backend);

    let pdf = pdf_with_pages(&["Patient: Jane Doe"]);
    let response = router(state)
        .oneshot(upload_request("report.pdf", &pdf))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"], json!({"extracted_text": "hello world"}));
}

#[tokio::test]
async fn upload_embeds_model_failure_in_success_envelope() {
    let backend = Arc::new(MockBackend::failing("connection reset"));
    let (state, scratch_dir) = test_state(backend.clone());

    let pdf = pdf_with_pages(&["Patient: Jane Doe"]);
    let response = router(state)
        .oneshot(upload_request("report.pdf", &pdf))
        .await
        .unwrap();

    // A failed model call still succeeds transport-wise
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["error"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
    assert_eq!(body["extracted_text"], json!("Patient: Jane Doe"));

    // Cleanup holds regardless of the model outcome
    assert_eq!(scratch_entries(&scratch_dir), 0);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn upload_preflight_returns_empty_ok() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, _scratch_dir) = test_state(backend.clone());

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn generate_returns_completion_text() {
    let backend = Arc::new(MockBackend::new("You should rest and drink fluids."));
    let (state, _scratch_dir) = test_state(backend.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "user_query": "What should I do about my flu?",
                "relevant_text": "Diagnosis: flu",
                "health_data": "Age 34, no allergies"
            })
            .to_string(),
        ))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body,
        json!({"generated_text": "You should rest and drink fluids."})
    );

    // The prompt embeds all three context fields
    let messages = backend.last_messages().unwrap();
    assert!(messages[0].content.contains("What should I do about my flu?"));
    assert!(messages[0].content.contains("Diagnosis: flu"));
    assert!(messages[0].content.contains("Age 34, no allergies"));
}

#[tokio::test]
async fn generate_rejects_missing_fields() {
    let backend = Arc::new(MockBackend::new("unused"));
    let (state, _scratch_dir) = test_state(backend.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"user_query": "What should I do?"}).to_string(),
        ))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body, json!({"error": "Missing required fields"}));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn health_reports_service_status() {
    let backend = Arc::new(MockBackend::new("{}"));
    let (state, _scratch_dir) = test_state(backend);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["services"]["pdf_extractor"], json!(true));
    assert_eq!(body["services"]["completion_model"], json!("solar-pro"));
}
