//! API Router and Application State
//!
//! Callback endpoints for each configured account.

mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{GatewayError, GatewayResult};
use crate::facade::MessageFacade;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Facades keyed by account id
    pub facades: Arc<HashMap<String, MessageFacade>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(facades: impl IntoIterator<Item = MessageFacade>) -> Self {
        let facades = facades
            .into_iter()
            .map(|f| (f.context().account_id().to_string(), f))
            .collect();
        Self {
            facades: Arc::new(facades),
        }
    }

    /// Look up the facade serving `account`.
    pub fn facade(&self, account: &str) -> GatewayResult<&MessageFacade> {
        self.facades
            .get(account)
            .ok_or_else(|| GatewayError::UnknownAccount(account.to_string()))
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Platform callbacks
        .route(
            "/wx/{account}",
            get(handlers::challenge).post(handlers::message),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Number of configured accounts
    accounts: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        accounts: state.facades.len(),
    })
}
