//! autoscaler-api — REST API for application scaling policies.
//!
//! Provides axum route handlers that store and read the autoscaling
//! policy document attached to each application.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | PUT | `/v1/apps/{app_id}/policy` | Create or replace an app's policy |
//! | GET | `/v1/apps/{app_id}/policy` | Get an app's policy |
//! | GET | `/v1/apps` | List app ids that have a policy |
//! | GET | `/v1/policies` | List all policies |

pub mod handlers;
pub mod policy;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use autoscaler_state::PolicyRepository;

pub use policy::{PolicyError, PolicyResponse, upsert_policy};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub repo: Arc<dyn PolicyRepository>,
}

/// Build the API router over the given policy repository.
pub fn build_router<R: PolicyRepository + 'static>(repo: R) -> Router {
    let state = ApiState {
        repo: Arc::new(repo),
    };

    let api_routes = Router::new()
        .route(
            "/apps/{app_id}/policy",
            get(handlers::get_policy).put(handlers::put_policy),
        )
        .route("/apps", get(handlers::list_app_ids))
        .route("/policies", get(handlers::list_policies))
        .with_state(state);

    Router::new().nest("/v1", api_routes)
}
