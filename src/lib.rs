//! Lead Intake API Library
//!
//! Accepts lead registration forms over HTTP, validates them, rejects
//! duplicates by email or document number, and keeps accepted leads in
//! memory for listing.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types and their HTTP mapping.
//! - `handlers`: HTTP request handlers and shared state.
//! - `models`: Candidate and lead records, response bodies.
//! - `store`: In-memory lead store and duplicate lookup.
//! - `validation`: Submission validation pipeline.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::handlers::AppState;

/// Builds the application router around an already constructed state.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    let lead_routes = Router::new()
        .route(
            "/api/lead",
            get(handlers::list_leads).post(handlers::submit_lead),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit (prevents memory exhaustion)
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(lead_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
