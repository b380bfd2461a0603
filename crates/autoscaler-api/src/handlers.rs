//! REST API handlers.
//!
//! Bodies use one envelope: `{"success": true, "data": ...}` on success,
//! `{"success": false, "error": "..."}` otherwise.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use autoscaler_state::{PolicyRepository, StateError};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::ApiState;
use crate::policy::upsert_policy;

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = Envelope {
        success: true,
        data: Some(data),
        error: None,
    };
    (status, Json(body)).into_response()
}

fn reject(status: StatusCode, reason: impl Into<String>) -> Response {
    let body = Envelope::<()> {
        success: false,
        data: None,
        error: Some(reason.into()),
    };
    (status, Json(body)).into_response()
}

fn store_failure(e: &StateError) -> Response {
    reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ── Policies ───────────────────────────────────────────────────

/// PUT /v1/apps/{app_id}/policy
pub async fn put_policy(
    State(state): State<ApiState>,
    Path(app_id): Path<String>,
    Json(policy_json): Json<Value>,
) -> Response {
    if app_id.trim().is_empty() {
        return reject(StatusCode::BAD_REQUEST, "app_id must not be empty");
    }

    match upsert_policy(state.repo.as_ref(), &app_id, policy_json).await {
        Ok(resp) => respond(resp.status_code, resp.response),
        Err(e) => reject(e.status_code(), e.to_string()),
    }
}

/// GET /v1/apps/{app_id}/policy
pub async fn get_policy(State(state): State<ApiState>, Path(app_id): Path<String>) -> Response {
    match state.repo.get(&app_id).await {
        Ok(Some(record)) => respond(StatusCode::OK, record),
        Ok(None) => reject(StatusCode::NOT_FOUND, "policy not found"),
        Err(e) => {
            error!(%app_id, error = %e, "failed to read policy");
            store_failure(&e)
        }
    }
}

/// GET /v1/policies
pub async fn list_policies(State(state): State<ApiState>) -> Response {
    match state.repo.list().await {
        Ok(records) => respond(StatusCode::OK, records),
        Err(e) => store_failure(&e),
    }
}

/// GET /v1/apps
pub async fn list_app_ids(State(state): State<ApiState>) -> Response {
    match state.repo.app_ids().await {
        Ok(ids) => respond(StatusCode::OK, ids),
        Err(e) => store_failure(&e),
    }
}
