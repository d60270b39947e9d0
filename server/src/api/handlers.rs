//! Callback Handlers

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use tracing::instrument;

use super::AppState;
use crate::error::GatewayError;
use crate::facade::{ChallengeParams, MessageParams};

/// Answer the server-ownership challenge.
///
/// GET /wx/{account}
#[instrument(skip_all, fields(account = %account))]
pub async fn challenge(
    State(state): State<AppState>,
    Path(account): Path<String>,
    Query(params): Query<ChallengeParams>,
) -> Result<String, GatewayError> {
    state.facade(&account)?.verify_challenge(&params)
}

/// Handle a pushed message.
///
/// POST /wx/{account}
#[instrument(skip_all, fields(account = %account))]
pub async fn message(
    State(state): State<AppState>,
    Path(account): Path<String>,
    Query(params): Query<MessageParams>,
    body: String,
) -> Result<impl IntoResponse, GatewayError> {
    let reply = state
        .facade(&account)?
        .handle_message(&params, &body)
        .await?;

    let content_type = if reply.starts_with('<') {
        "application/xml"
    } else {
        "text/plain; charset=utf-8"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], reply))
}
