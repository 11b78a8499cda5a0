//! Integration tests for the intake service routes

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use fluradar_domain::{Component, DuplicatePolicy, ExternalRecord, RecordSource, YesNo};
use fluradar_form::handlers::{create_router, AppState};
use fluradar_form::render::PROMPT;
use fluradar_scorer::MockScorer;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Record source that answers from memory and remembers what it was asked
#[derive(Clone, Default)]
struct StubSource {
    record: Option<ExternalRecord>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl StubSource {
    fn with_record(record: ExternalRecord) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RecordSource for StubSource {
    type Error = String;

    async fn fetch(&self, token: &str, location: &str) -> Result<ExternalRecord, String> {
        self.requests
            .lock()
            .unwrap()
            .push((token.to_string(), location.to_string()));
        self.record
            .clone()
            .ok_or_else(|| "401 Unauthorized".to_string())
    }
}

fn patient_record() -> ExternalRecord {
    ExternalRecord::new(vec![
        Component::integer("Pulse", 88),
        Component::integer("Sore throat?", 1),
        Component::decimal("Unrelated lab", 4.2),
    ])
}

fn app(source: StubSource, scorer: MockScorer) -> axum::Router {
    create_router(AppState::new(source, scorer, DuplicatePolicy::FirstMatch).unwrap())
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Every field at its form default, as a JSON object
fn default_estimate_body() -> Value {
    json!({
        "temp": 37.3, "height": 160.0, "weight": 60.0,
        "DOI": 1, "WOS": 1, "season": 1, "rr": 12, "sbp": 90, "o2s": 100, "pulse": 100,
        "fluvaccine": "No", "cough": "No", "coughsputum": "No", "sorethroat": "No",
        "rhinorrhea": "No", "sinuspain": "No", "exposehuman": "No", "travel": "No",
        "medhistav": "No", "pastmedchronlundis": "No"
    })
}

fn default_submission() -> Vec<(String, String)> {
    default_estimate_body()
        .as_object()
        .unwrap()
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

fn urlencode(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&")
}

#[tokio::test]
async fn test_page_without_record_uses_defaults() {
    let source = StubSource::with_record(patient_record());
    let scorer = MockScorer::new(41.237);
    let response = app(source.clone(), scorer.clone()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<title>Flu Radar</title>"));
    assert!(html.contains("Predicted probability (%)"));
    assert!(html.contains("41.24"));
    assert!(html.contains("name=\"temp\""));
    assert!(html.contains("value=\"37.3\""));
    assert!(!html.contains("View fetched patient data"));

    assert!(source.requests().is_empty());
    let inputs = scorer.last_inputs().unwrap();
    assert_eq!(inputs.pulse, 100);
    assert_eq!(inputs.sore_throat, YesNo::No);
}

#[tokio::test]
async fn test_page_prefilled_from_record() {
    let source = StubSource::with_record(patient_record());
    let scorer = MockScorer::new(10.0);
    let response = app(source.clone(), scorer.clone())
        .oneshot(get("/?token=secret&obs=https%3A%2F%2Fehr.example%2FObservation%2F7"))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("View fetched patient data"));
    assert!(html.contains("value=\"88\""));
    assert!(html.contains("<option value=\"Yes\" selected>Yes</option>"));

    assert_eq!(
        source.requests(),
        vec![(
            "secret".to_string(),
            "https://ehr.example/Observation/7".to_string()
        )]
    );
    let inputs = scorer.last_inputs().unwrap();
    assert_eq!(inputs.pulse, 88);
    assert_eq!(inputs.sore_throat, YesNo::Yes);
    assert_eq!(inputs.temp, 37.3);
}

#[tokio::test]
async fn test_fetch_failure_still_renders() {
    let scorer = MockScorer::new(5.0);
    let response = app(StubSource::failing(), scorer.clone())
        .oneshot(get("/?token=expired&obs=https%3A%2F%2Fehr.example%2FObservation%2F7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("View fetched patient data"));
    assert!(html.contains("5.00"));
    assert_eq!(scorer.call_count(), 1);
}

#[tokio::test]
async fn test_api_fields_end_to_end() {
    let response = app(StubSource::with_record(patient_record()), MockScorer::default())
        .oneshot(get("/api/fields?token=t&obs=https%3A%2F%2Fehr.example%2FObservation%2F1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({"pulse": 88, "sorethroat": "Yes"}));
}

#[tokio::test]
async fn test_api_fields_without_parameters() {
    let source = StubSource::with_record(patient_record());
    let response = app(source.clone(), MockScorer::default())
        .oneshot(get("/api/fields?token=t"))
        .await
        .unwrap();

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({}));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_submission_scores() {
    let scorer = MockScorer::new(73.5);
    let mut fields = default_submission();
    fields.push(("token".to_string(), "secret".to_string()));

    let response = app(StubSource::failing(), scorer.clone())
        .oneshot(post_form(urlencode(&fields)))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("73.50"));
    assert!(html.contains("name=\"token\" value=\"secret\""));
    assert_eq!(scorer.call_count(), 1);
}

#[tokio::test]
async fn test_blank_field_withholds_scoring() {
    let source = StubSource::with_record(patient_record());
    let scorer = MockScorer::new(73.5);
    let fields: Vec<(String, String)> = default_submission()
        .into_iter()
        .map(|(k, v)| if k == "pulse" { (k, String::new()) } else { (k, v) })
        .collect();

    let response = app(source.clone(), scorer.clone())
        .oneshot(post_form(urlencode(&fields)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(PROMPT));
    assert!(!html.contains("Predicted probability (%)"));
    assert!(html.contains("Pulse is required"));
    assert_eq!(scorer.call_count(), 0);
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_out_of_range_field_withholds_scoring() {
    let scorer = MockScorer::new(73.5);
    let fields: Vec<(String, String)> = default_submission()
        .into_iter()
        .map(|(k, v)| if k == "o2s" { (k, "140".to_string()) } else { (k, v) })
        .collect();

    let response = app(StubSource::failing(), scorer.clone())
        .oneshot(post_form(urlencode(&fields)))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains(PROMPT));
    assert!(html.contains("value=\"140\""));
    assert_eq!(scorer.call_count(), 0);
}

#[tokio::test]
async fn test_scoring_failure_renders_notice() {
    let response = app(StubSource::failing(), MockScorer::failing())
        .oneshot(get("/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Scoring is unavailable"));
}

#[tokio::test]
async fn test_api_estimate() {
    let scorer = MockScorer::new(33.3);
    let mut body = default_estimate_body();
    body["sorethroat"] = json!(1);

    let response = app(StubSource::failing(), scorer.clone())
        .oneshot(post_json("/api/estimate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({"probability": 33.3}));
    assert_eq!(scorer.last_inputs().unwrap().sore_throat, YesNo::Yes);
}

#[tokio::test]
async fn test_api_estimate_missing_field() {
    let mut body = default_estimate_body();
    body.as_object_mut().unwrap().remove("pulse");

    let response = app(StubSource::failing(), MockScorer::default())
        .oneshot(post_json("/api/estimate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["problems"][0]["field"], json!("pulse"));
}

#[tokio::test]
async fn test_api_estimate_scorer_failure() {
    let response = app(StubSource::failing(), MockScorer::failing())
        .oneshot(post_json("/api/estimate", default_estimate_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health() {
    let response = app(StubSource::failing(), MockScorer::default())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({"status": "ok"}));
}
