//! End-to-end tests against a mock analysis server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};

use isittrue_client::{AnalysisClient, AnalysisForm, ClientError, InputMode, ValidationError};
use isittrue_media::{FileSource, MediaSource, decode_data_url};
use isittrue_types::AnalysisRequest;

/// Mock backend: records every request and replies with a canned response.
struct MockServer {
    received: Mutex<Vec<(Option<String>, Value)>>,
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl MockServer {
    fn new(status: StatusCode, body: &str) -> Arc<Self> {
        Self::delayed(status, body, Duration::ZERO)
    }

    fn delayed(status: StatusCode, body: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(Vec::new()),
            status,
            body: body.to_string(),
            delay,
        })
    }

    fn calls(&self) -> Vec<(Option<String>, Value)> {
        self.received.lock().unwrap().clone()
    }
}

async fn analyze_handler(
    State(mock): State<Arc<MockServer>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.received.lock().unwrap().push((content_type, value));

    tokio::time::sleep(mock.delay).await;
    (
        mock.status,
        [(header::CONTENT_TYPE, "application/json")],
        mock.body.clone(),
    )
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(json!({ "status": "ok" }))
}

/// Start the mock on an ephemeral port and return its base URL.
async fn start(mock: Arc<MockServer>) -> String {
    let app = Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/health", get(health_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> AnalysisClient {
    AnalysisClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_text_scenario() {
    let mock = MockServer::new(StatusCode::OK, r#"{"result":"This is false."}"#);
    let client = client(&start(mock.clone()).await);

    let mut form = AnalysisForm::default();
    form.set_text("The sky is green");
    let view = form.submit(&client).await;

    assert_eq!(view.result.unwrap().text, "This is false.");
    assert!(!view.loading);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.as_deref(), Some("application/json"));
    assert_eq!(calls[0].1, json!({ "text": "The sky is green" }));
}

#[tokio::test]
async fn test_invalid_url_makes_no_call() {
    let mock = MockServer::new(StatusCode::OK, r#"{"result":"unused"}"#);
    let client = client(&start(mock.clone()).await);

    let mut form = AnalysisForm::default();
    form.switch_mode(InputMode::Url);
    form.set_url("not a url");
    let view = form.submit(&client).await;

    assert!(view.error.unwrap().starts_with("Invalid URL"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_valid_url_sent_as_text() {
    let mock = MockServer::new(StatusCode::OK, r#"{"result":"checked"}"#);
    let client = client(&start(mock.clone()).await);

    let mut form = AnalysisForm::default();
    form.switch_mode(InputMode::Url);
    form.set_url("https://www.wikipedia.org/wiki/Earth");
    form.submit(&client).await;

    assert_eq!(
        mock.calls()[0].1,
        json!({ "text": "https://www.wikipedia.org/wiki/Earth" })
    );
}

#[tokio::test]
async fn test_server_error_message_verbatim() {
    let mock = MockServer::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"upstream timeout"}"#,
    );
    let client = client(&start(mock).await);

    let err = client
        .submit(&AnalysisRequest::text("claim"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream timeout");
}

#[tokio::test]
async fn test_server_error_generic_fallback() {
    let mock = MockServer::new(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
    let client = client(&start(mock).await);

    let mut form = AnalysisForm::default();
    form.set_text("claim");
    let view = form.submit(&client).await;
    assert_eq!(view.error.as_deref(), Some("Server error: 503"));
}

#[tokio::test]
async fn test_lenient_failure_on_ok_status() {
    let mock = MockServer::new(
        StatusCode::OK,
        r#"{"success":false,"error":"Quota exceeded, try again later"}"#,
    );
    let client = client(&start(mock).await);

    let err = client
        .submit(&AnalysisRequest::text("claim"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 200, .. }));
    assert_eq!(err.to_string(), "Quota exceeded, try again later");
}

#[tokio::test]
async fn test_result_type_rendered() {
    let mock = MockServer::new(
        StatusCode::OK,
        r#"{"result":"Likely human-written.","type":"ai_detection"}"#,
    );
    let client = client(&start(mock).await);

    let mut form = AnalysisForm::default();
    form.set_text("some paragraph");
    let result = form.submit(&client).await.result.unwrap();
    assert_eq!(result.text, "Likely human-written.");
    assert_eq!(result.type_line.as_deref(), Some("Type: 🤖 AI Detection"));
}

#[tokio::test]
async fn test_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client
        .submit(&AnalysisRequest::text("claim"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.to_string().starts_with("Network error: "));
    assert!(!client.is_busy());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock = MockServer::delayed(
        StatusCode::OK,
        r#"{"result":"late"}"#,
        Duration::from_secs(3),
    );
    let base = start(mock).await;
    let client = AnalysisClient::new(&base, Duration::from_millis(200)).unwrap();

    let err = client
        .submit(&AnalysisRequest::text("claim"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_second_submission_rejected_while_pending() {
    let mock = MockServer::delayed(
        StatusCode::OK,
        r#"{"result":"first"}"#,
        Duration::from_millis(500),
    );
    let client = Arc::new(client(&start(mock.clone()).await));

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.submit(&AnalysisRequest::text("one")).await })
    };
    // Wait until the first request is in flight.
    for _ in 0..50 {
        if client.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(client.is_busy());

    let second = client.submit(&AnalysisRequest::text("two")).await;
    assert!(matches!(
        second,
        Err(ClientError::Validation(ValidationError::Busy))
    ));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.result, "first");
    assert_eq!(mock.calls().len(), 1);
    assert!(!client.is_busy());
}

#[tokio::test]
async fn test_image_file_round_trip() {
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRpixels";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claim.png");
    std::fs::write(&path, png).unwrap();

    let mock = MockServer::new(StatusCode::OK, r#"{"result":"Edited photo."}"#);
    let client = client(&start(mock.clone()).await);

    let media = FileSource::image(&path, 1024).capture().await.unwrap();
    let mut form = AnalysisForm::default();
    form.switch_mode(InputMode::Image);
    form.attach(media).unwrap();
    form.set_caption("Is this real?");
    let view = form.submit(&client).await;
    assert_eq!(view.result.unwrap().text, "Edited photo.");

    let calls = mock.calls();
    let body = &calls[0].1;
    assert_eq!(body["text"], "Is this real?");
    let decoded = decode_data_url(body["image"].as_str().unwrap()).unwrap();
    assert_eq!(decoded.mime_type, "image/png");
    assert_eq!(decoded.data, png);
}

#[tokio::test]
async fn test_health() {
    let mock = MockServer::new(StatusCode::OK, "{}");
    let client = client(&start(mock).await);
    let health = client.health().await.unwrap();
    assert!(health.is_ok());
}
