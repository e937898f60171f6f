// HTTP request handlers
use crate::domain::analysis::AnalysisSubmission;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ProcessDataRequest {
    #[serde(default)]
    pub chart_base64: Option<String>,
    #[serde(default)]
    pub chart_data: Option<Value>,
    #[serde(default)]
    pub full_data: Option<Value>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl From<ProcessDataRequest> for AnalysisSubmission {
    fn from(request: ProcessDataRequest) -> Self {
        Self {
            chart_base64: request.chart_base64,
            chart_data: request.chart_data,
            full_data: request.full_data,
            additional_info: request.additional_info,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordQuery {
    #[serde(default)]
    pub given_password: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PasswordResponse {
    pub correct: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn root() -> Json<Value> {
    Json(json!({"Hello": "World"}))
}

/// Analyze a chart and return the critique as a JSON string
pub async fn process_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessDataRequest>,
) -> Json<String> {
    let critique = state.analysis_service.analyze(request.into()).await;
    Json(critique)
}

/// Check the site password. Without a configured password nothing matches.
pub async fn verify_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PasswordQuery>,
) -> Json<PasswordResponse> {
    let correct = state
        .site_password
        .as_deref()
        .is_some_and(|expected| expected == query.given_password);

    if !correct {
        tracing::info!("Rejected password attempt");
    }

    Json(PasswordResponse { correct })
}
