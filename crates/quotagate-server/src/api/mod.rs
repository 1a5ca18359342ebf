//! HTTP routes.
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /capability/consume` | spend one unit, then call the generation backend |
//! | `GET /quota/status` | read-only quota view |
//! | `POST /billing/subscribe` | create customer and subscription |
//! | `POST /billing/webhook` | provider event ingestion |
//! | `POST /billing/upgrade` | manual entitlement grant |
//! | `POST /identity/login` | create or refresh the caller's account |
//! | `GET /health` | liveness |

mod billing;
mod capability;
mod error;
mod identity;

use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::request::Parts;
use axum::routing::{get, post};
use quotagate_account::GateError;

pub use error::{ApiError, status_for};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/capability/consume", post(capability::consume))
        .route("/quota/status", get(capability::status))
        .route("/billing/subscribe", post(billing::subscribe))
        .route("/billing/webhook", post(billing::webhook))
        .route("/billing/upgrade", post(billing::upgrade))
        .route("/identity/login", post(identity::login))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// External identity of the caller, from the trusted identity header.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.identity_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Caller(v.to_string()))
            .ok_or(ApiError::Gate(GateError::Unauthenticated))
    }
}
