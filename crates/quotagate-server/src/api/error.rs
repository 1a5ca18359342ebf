//! Mapping from gate errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quotagate_account::GateError;
use quotagate_metrics::{ERROR_BAD_REQUEST, record_error};
use serde::Serialize;

/// Handler error.
#[derive(Debug)]
pub enum ApiError {
    Gate(GateError),
    /// Request body failed validation before reaching the gate.
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self::Gate(err)
    }
}

/// HTTP status for a gate error. No kind maps to a success status.
pub fn status_for(err: &GateError) -> StatusCode {
    match err {
        GateError::Unauthenticated => StatusCode::UNAUTHORIZED,
        GateError::EntitlementRequired => StatusCode::FORBIDDEN,
        GateError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
        GateError::SignatureInvalid(_) | GateError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
        GateError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        GateError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Gate(err) => (status_for(&err), err.kind(), err.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ERROR_BAD_REQUEST, message),
        };
        record_error(kind);
        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_an_error_status() {
        let cases = [
            (GateError::Unauthenticated, 401),
            (GateError::EntitlementRequired, 403),
            (GateError::QuotaExceeded, 429),
            (GateError::SignatureInvalid("x".into()), 400),
            (GateError::MalformedEvent("x".into()), 400),
            (GateError::BackendUnavailable("x".into()), 502),
            (GateError::StoreUnavailable("x".into()), 503),
        ];
        for (err, code) in cases {
            let status = status_for(&err);
            assert_eq!(status.as_u16(), code, "{err:?}");
            assert!(!status.is_success());
        }
    }

    #[test]
    fn bad_request_response() {
        let resp = ApiError::BadRequest("nope".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
