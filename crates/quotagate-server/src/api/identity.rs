use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use quotagate_account::{IdentityProfile, UserAccount};
use quotagate_metrics::record_identity_login;
use serde::Serialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account: UserAccount,
    pub created: bool,
}

/// Called by the login glue after the identity provider has verified the
/// user.
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<LoginResponse>, ApiError> {
    let mut profile: IdentityProfile =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    profile.external_id = profile.external_id.trim().to_string();
    if profile.external_id.is_empty() {
        return Err(ApiError::BadRequest("external_id is required".into()));
    }

    let (account, created) = state.ledger.upsert_identity(&profile).await?;
    record_identity_login(created);
    Ok(Json(LoginResponse { account, created }))
}
