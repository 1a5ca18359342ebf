use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use quotagate_account::webhook::SIGNATURE_HEADER;
use quotagate_account::{GateError, QuotaStatus};
use quotagate_metrics::{record_manual_grant, record_subscription_created, record_webhook_event};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::{ApiError, Caller};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct SubscribeRequest {
    email: Option<String>,
    payment_method: Option<String>,
    #[serde(alias = "priceId")]
    price_id: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Create a provider customer and a subscription for it.
///
/// The entitlement itself is granted later, when the provider's
/// subscription webhook arrives.
pub async fn subscribe(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let req: SubscribeRequest = if body.is_empty() {
        SubscribeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let price_id = non_empty(req.price_id).or_else(|| state.default_price_id.as_deref().map(str::to_string));
    let (Some(email), Some(payment_method), Some(price_id)) =
        (non_empty(req.email), non_empty(req.payment_method), price_id)
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: email, payment_method, and price_id.".into(),
        ));
    };

    let customer_id = state
        .payments
        .create_customer(&email, &payment_method)
        .await
        .map_err(GateError::backend)?;
    let subscription = state
        .payments
        .create_subscription(&customer_id, &price_id)
        .await
        .map_err(GateError::backend)?;

    record_subscription_created();
    info!(%customer_id, %price_id, "subscription created");
    Ok(Json(subscription))
}

/// Provider event delivery. Acknowledged only once the ledger write is done.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    match state.webhooks.ingest(&body, signature).await {
        Ok(ack) => {
            record_webhook_event(ack.kind, ack.outcome);
            Ok(Json(json!({ "received": true })))
        }
        Err(e) => {
            record_webhook_event("unknown", e.kind());
            Err(e.into())
        }
    }
}

/// Manual upgrade for the calling identity.
pub async fn upgrade(
    State(state): State<AppState>,
    Caller(external_id): Caller,
) -> Result<Json<QuotaStatus>, ApiError> {
    state.ledger.grant_manual_entitlement(&external_id).await?;
    record_manual_grant();
    Ok(Json(state.gate.status(&external_id).await?))
}
