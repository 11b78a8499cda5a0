//! HTTP request handlers for the intake service.
//!
//! Serves the intake page, its JSON counterparts, and a health check using
//! axum.

use crate::form::{fields_to_json, FieldProblem, FormState};
use crate::intake::load_fields;
use crate::render::{Outcome, Page, PageRenderer, RenderError};
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use fluradar_domain::{CanonicalFieldSet, DuplicatePolicy, ProbabilityScorer, RecordSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state
pub struct AppState<R, S> {
    /// Upstream record source
    pub source: Arc<R>,
    /// Probability scorer
    pub scorer: Arc<S>,
    /// Which component wins when a label repeats
    pub duplicates: DuplicatePolicy,
    /// Compiled intake page
    pub renderer: Arc<PageRenderer>,
}

impl<R, S> AppState<R, S> {
    /// Wrap a source and a scorer for sharing across requests
    ///
    /// Fails if the page template does not compile.
    pub fn new(source: R, scorer: S, duplicates: DuplicatePolicy) -> Result<Self, RenderError> {
        Ok(Self {
            source: Arc::new(source),
            scorer: Arc::new(scorer),
            duplicates,
            renderer: Arc::new(PageRenderer::new()?),
        })
    }

    fn render(&self, page: &Page<'_>) -> Result<Html<String>, AppError> {
        self.renderer.render(page).map(Html).map_err(|e| {
            error!(error = %e, "Page rendering failed");
            AppError::Render(e.to_string())
        })
    }
}

// Derived Clone would require R: Clone and S: Clone
impl<R, S> Clone for AppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            scorer: Arc::clone(&self.scorer),
            duplicates: self.duplicates,
            renderer: Arc::clone(&self.renderer),
        }
    }
}

/// Query parameters naming the record to load
#[derive(Debug, Default, Deserialize)]
pub struct IntakeQuery {
    /// Bearer token for the record source
    #[serde(default)]
    pub token: String,
    /// Observation URL
    #[serde(default)]
    pub obs: String,
}

/// Probability response
#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateResponse {
    /// Predicted probability in percent
    pub probability: f64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Fields blocking scoring, if that is the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<ProblemEntry>,
}

/// One blocking field in an error response
#[derive(Debug, Serialize)]
pub struct ProblemEntry {
    /// Canonical key
    pub field: String,
    /// Human-readable description
    pub problem: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request body is not usable
    BadRequest(String),
    /// Some fields are missing or out of range
    Incomplete(Vec<FieldProblem>),
    /// Scoring service failed
    Scoring(String),
    /// Page could not be rendered
    Render(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, problems) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            AppError::Incomplete(problems) => {
                let entries = problems
                    .iter()
                    .map(|p| ProblemEntry {
                        field: p.field.key().to_string(),
                        problem: p.to_string(),
                    })
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Missing or invalid clinical fields".to_string(),
                    entries,
                )
            }
            AppError::Scoring(msg) => (StatusCode::BAD_GATEWAY, msg, Vec::new()),
            AppError::Render(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, Vec::new()),
        };

        (status, Json(ErrorResponse { error, problems })).into_response()
    }
}

/// Score the form if it is complete
async fn estimate<S>(scorer: &S, form: &FormState) -> Outcome
where
    S: ProbabilityScorer + Sync,
{
    let inputs = match form.inputs() {
        Ok(inputs) => inputs,
        Err(problems) => {
            info!(problems = problems.len(), "Scoring withheld");
            return Outcome::Incomplete;
        }
    };

    match scorer.predict(&inputs).await {
        Ok(probability) => {
            info!(probability, "Scored clinical inputs");
            Outcome::Probability(probability)
        }
        Err(e) => {
            warn!(error = %e, "Scoring failed");
            Outcome::ScoringFailed(e.to_string())
        }
    }
}

/// GET / - Intake page, prefilled from the record when one is named
async fn index<R, S>(
    State(state): State<AppState<R, S>>,
    Query(query): Query<IntakeQuery>,
) -> Result<Html<String>, AppError>
where
    R: RecordSource + Send + Sync + 'static,
    S: ProbabilityScorer + Send + Sync + 'static,
{
    let fetched = load_fields(state.source.as_ref(), &query.token, &query.obs, state.duplicates).await;
    let form = FormState::prefilled(fetched.as_ref().unwrap_or(&CanonicalFieldSet::new()));
    let outcome = estimate(state.scorer.as_ref(), &form).await;

    state.render(&Page {
        form: &form,
        outcome,
        fetched: fetched.as_ref(),
        token: &query.token,
        observation_url: &query.obs,
    })
}

/// POST / - Score a submitted form
///
/// The submission is taken as it stands; the record is not fetched again.
async fn submit<R, S>(
    State(state): State<AppState<R, S>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, AppError>
where
    R: RecordSource + Send + Sync + 'static,
    S: ProbabilityScorer + Send + Sync + 'static,
{
    let form = FormState::from_submission(&fields);
    let outcome = estimate(state.scorer.as_ref(), &form).await;

    let token = fields.get("token").map(String::as_str).unwrap_or("");
    let observation_url = fields.get("obs").map(String::as_str).unwrap_or("");

    state.render(&Page {
        form: &form,
        outcome,
        fetched: None,
        token,
        observation_url,
    })
}

/// GET /api/fields - Extracted fields as JSON
async fn api_fields<R, S>(
    State(state): State<AppState<R, S>>,
    Query(query): Query<IntakeQuery>,
) -> Json<serde_json::Value>
where
    R: RecordSource + Send + Sync + 'static,
    S: ProbabilityScorer + Send + Sync + 'static,
{
    let fetched = load_fields(state.source.as_ref(), &query.token, &query.obs, state.duplicates)
        .await
        .unwrap_or_default();
    Json(fields_to_json(&fetched))
}

/// POST /api/estimate - Score a JSON object of canonical fields
async fn api_estimate<R, S>(
    State(state): State<AppState<R, S>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<EstimateResponse>, AppError>
where
    R: RecordSource + Send + Sync + 'static,
    S: ProbabilityScorer + Send + Sync + 'static,
{
    let object = body
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Expected a JSON object".to_string()))?;

    let form = FormState::from_json(object);
    let inputs = form.inputs().map_err(AppError::Incomplete)?;

    let probability = state.scorer.predict(&inputs).await.map_err(|e| {
        warn!(error = %e, "Scoring failed");
        AppError::Scoring(e.to_string())
    })?;

    Ok(Json(EstimateResponse { probability }))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<R, S>(state: AppState<R, S>) -> AxumRouter
where
    R: RecordSource + Send + Sync + 'static,
    S: ProbabilityScorer + Send + Sync + 'static,
{
    AxumRouter::new()
        .route("/", get(index::<R, S>).post(submit::<R, S>))
        .route("/api/fields", get(api_fields::<R, S>))
        .route("/api/estimate", post(api_estimate::<R, S>))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use fluradar_domain::{Component, ExternalRecord};
    use fluradar_scorer::MockScorer;
    use tower::ServiceExt; // for oneshot

    struct FixedSource(Result<ExternalRecord, String>);

    impl RecordSource for FixedSource {
        type Error = String;

        async fn fetch(&self, _token: &str, _location: &str) -> Result<ExternalRecord, String> {
            self.0.clone()
        }
    }

    fn create_test_state(scorer: MockScorer) -> AppState<FixedSource, MockScorer> {
        let record = ExternalRecord::new(vec![
            Component::integer("Pulse", 88),
            Component::integer("Sore throat?", 1),
        ]);
        AppState::new(FixedSource(Ok(record)), scorer, DuplicatePolicy::FirstMatch).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(MockScorer::default()));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_index_scores_defaults() {
        let scorer = MockScorer::new(12.5);
        let app = create_router(create_test_state(scorer.clone()));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("12.50"));
        assert!(!html.contains("View fetched patient data"));
        assert_eq!(scorer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_api_fields() {
        let app = create_router(create_test_state(MockScorer::default()));

        let request = Request::builder()
            .uri("/api/fields?token=abc&obs=http%3A%2F%2Fehr%2FObservation%2F1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"pulse": 88, "sorethroat": "Yes"}));
    }

    #[tokio::test]
    async fn test_api_estimate_rejects_non_object() {
        let app = create_router(create_test_state(MockScorer::default()));

        let request = Request::builder()
            .method("POST")
            .uri("/api/estimate")
            .header("content-type", "application/json")
            .body(Body::from("[1, 2, 3]"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_render_error_is_500() {
        let response = AppError::Render("template rendering failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "template rendering failed");
        assert!(json.get("problems").is_none());
    }

    #[tokio::test]
    async fn test_index_escapes_query_values() {
        let app = create_router(create_test_state(MockScorer::default()));

        let request = Request::builder()
            .uri("/?token=%22%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;alert(1)&lt;&#x2F;script&gt;\""));
    }

    #[tokio::test]
    async fn test_api_estimate_incomplete() {
        let scorer = MockScorer::default();
        let app = create_router(create_test_state(scorer.clone()));

        let request = Request::builder()
            .method("POST")
            .uri("/api/estimate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"temp": 38.2}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["problems"].as_array().map(Vec::len), Some(19));
        assert_eq!(scorer.call_count(), 0);
    }
}
