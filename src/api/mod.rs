//! API module - HTTP request handlers
//!
//! Organizes all handlers for the REST API endpoints and builds the router
//! over them.

pub mod subscriptions;

use crate::storage::SubscriptionStore;
use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage contract; concrete backend chosen at startup
    pub store: Arc<dyn SubscriptionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router; wrong methods get 405 from axum.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/createsub", post(subscriptions::create_subscription))
        .route("/getsub", get(subscriptions::get_subscription))
        .route("/updatesub", put(subscriptions::update_subscription))
        .route("/deletesub", delete(subscriptions::delete_subscription))
        .route("/list", get(subscriptions::list_subscriptions))
        .route("/amount", get(subscriptions::amount))
        .with_state(state)
}
