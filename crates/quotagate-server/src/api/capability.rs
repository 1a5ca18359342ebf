use std::time::Instant;

use axum::Json;
use axum::extract::State;
use quotagate_account::{GateError, QuotaStatus};
use quotagate_metrics::{record_consume, record_generation};
use serde::Serialize;
use tracing::{debug, warn};

use super::{ApiError, Caller};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub result: String,
    pub remaining: u32,
}

/// Spend one unit, then generate. A generation failure does not refund the
/// unit.
pub async fn consume(
    State(state): State<AppState>,
    Caller(external_id): Caller,
) -> Result<Json<ConsumeResponse>, ApiError> {
    let consumed = match state.gate.try_consume(&external_id).await {
        Ok(consumed) => consumed,
        Err(e) => {
            record_consume(e.kind());
            debug!(%external_id, error = %e, "consume refused");
            return Err(e.into());
        }
    };
    record_consume("ok");

    let started = Instant::now();
    let generated = state.generation.generate(&state.prompt).await;
    record_generation(started.elapsed().as_secs_f64(), generated.is_ok());

    match generated {
        Ok(result) => Ok(Json(ConsumeResponse {
            result,
            remaining: consumed.remaining,
        })),
        Err(e) => {
            warn!(%external_id, error = %e, "generation failed after quota spend");
            Err(GateError::backend(e).into())
        }
    }
}

pub async fn status(
    State(state): State<AppState>,
    Caller(external_id): Caller,
) -> Result<Json<QuotaStatus>, ApiError> {
    Ok(Json(state.gate.status(&external_id).await?))
}
