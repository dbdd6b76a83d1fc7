use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{CandidateRecord, LeadCreatedResponse, LeadListResponse};
use crate::store::LeadStore;
use crate::validation::{Decision, SubmissionValidator};

/// Shared application state injected into handlers.
#[derive(Debug)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Accepted leads for the lifetime of the server.
    pub store: LeadStore,
    /// Submission checks, configured with the blank-field policy.
    pub validator: SubmissionValidator,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let validator = SubmissionValidator::new(config.blank_policy);
        Self {
            config,
            store: LeadStore::new(),
            validator,
        }
    }
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-intake-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/lead
///
/// Accepts a lead registration form as JSON, validates it and stores it.
///
/// Flow:
/// 1. Require a JSON content type.
/// 2. Decode the body into a candidate record.
/// 3. Validate and insert under the store lock (duplicates cannot race).
///
/// # Returns
///
/// * `201` with the generated lead id, or an `AppError` mapped to 400/409/500.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<LeadCreatedResponse>), AppError> {
    require_json_content_type(&headers)?;

    let candidate: CandidateRecord = serde_json::from_slice(&body)?;
    tracing::debug!("POST /api/lead - candidate: {:?}", candidate);

    match state.store.submit(&candidate, &state.validator)? {
        Decision::Accepted(lead) => {
            tracing::info!("New lead stored: {} <{}>", lead.id, lead.email);
            tracing::info!("Total leads: {}", state.store.count()?);

            Ok((
                StatusCode::CREATED,
                Json(LeadCreatedResponse {
                    success: true,
                    message: "Lead guardado exitosamente".to_string(),
                    lead_id: lead.id,
                }),
            ))
        }
        Decision::Rejected(reason) => Err(reason.into()),
    }
}

/// GET /api/lead
///
/// Lists every stored lead in insertion order.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LeadListResponse>, AppError> {
    let leads = state.store.all()?;
    tracing::debug!("GET /api/lead - {} lead(s)", leads.len());

    Ok(Json(LeadListResponse {
        success: true,
        total: leads.len(),
        leads,
    }))
}

/// Accepts any content type containing `application/json` (parameters allowed).
fn require_json_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Err(AppError::UnsupportedContentType(None));
    };

    match value.to_str() {
        Ok(ct) if ct.contains("application/json") => Ok(()),
        Ok(ct) => Err(AppError::UnsupportedContentType(Some(ct.to_string()))),
        Err(_) => Err(AppError::UnsupportedContentType(Some(
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        ))),
    }
}
