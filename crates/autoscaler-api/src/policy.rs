//! Policy upsert — create an app's scaling policy, or replace it.
//!
//! [`upsert_policy`] runs a find-or-create against the repository. A fresh
//! record answers `201 Created`; an existing one is overwritten with a
//! conditional update and answers `200 OK`. Any repository failure is
//! logged with the `app_id` and surfaced as a `500`.

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use autoscaler_state::{PolicyRecord, PolicyRepository, StateError};

/// Successful outcome of an upsert.
///
/// `response` is `None` only when the update step matched no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyResponse {
    pub status_code: StatusCode,
    pub response: Option<PolicyRecord>,
}

/// Failure of either repository step of an upsert.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to create policy for app {app_id}: {source}")]
    CreateFailed { app_id: String, source: StateError },

    #[error("failed to update policy for app {app_id}: {source}")]
    UpdateFailed { app_id: String, source: StateError },
}

impl PolicyError {
    /// Both variants answer 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn app_id(&self) -> &str {
        match self {
            Self::CreateFailed { app_id, .. } | Self::UpdateFailed { app_id, .. } => app_id,
        }
    }
}

/// Create the policy for `app_id` if absent, otherwise replace its document.
///
/// Performs exactly one of create or update. `app_id` is assumed valid and
/// `policy_json` is stored as given.
pub async fn upsert_policy(
    repo: &dyn PolicyRepository,
    app_id: &str,
    policy_json: Value,
) -> Result<PolicyResponse, PolicyError> {
    let defaults = PolicyRecord::new(app_id, policy_json.clone());

    let (record, created) = match repo.find_or_create(app_id, defaults).await {
        Ok(found) => found,
        Err(e) => {
            error!(%app_id, error = %e, "failed to create policy");
            return Err(PolicyError::CreateFailed {
                app_id: app_id.to_string(),
                source: e,
            });
        }
    };

    if created {
        info!(%app_id, "no policy exists, creating policy");
        return Ok(PolicyResponse {
            status_code: StatusCode::CREATED,
            response: Some(record),
        });
    }

    info!(%app_id, "updating the existing policy");
    match repo.update(app_id, policy_json).await {
        Ok(rows) => {
            if rows.is_empty() {
                warn!(%app_id, "policy update matched no rows");
            }
            Ok(PolicyResponse {
                status_code: StatusCode::OK,
                response: rows.into_iter().next(),
            })
        }
        Err(e) => {
            error!(%app_id, error = %e, "failed to update policy");
            Err(PolicyError::UpdateFailed {
                app_id: app_id.to_string(),
                source: e,
            })
        }
    }
}
