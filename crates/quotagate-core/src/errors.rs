//! Error kind labels for metrics and logging.
//!
//! These constants keep error classification identical between the HTTP
//! responses, the log lines and the Prometheus labels.

/// No identity attached to the request, or the identity has no account.
pub const ERROR_UNAUTHENTICATED: &str = "unauthenticated";
/// Identity is known but has no paid entitlement.
pub const ERROR_ENTITLEMENT_REQUIRED: &str = "entitlement_required";
/// Ceiling reached for the current quota period.
pub const ERROR_QUOTA_EXCEEDED: &str = "quota_exceeded";
/// Webhook authenticity check failed.
pub const ERROR_SIGNATURE_INVALID: &str = "signature_invalid";
/// Webhook payload could not be parsed.
pub const ERROR_MALFORMED_EVENT: &str = "malformed_event";
/// Generation backend or payment provider failed.
pub const ERROR_BACKEND_UNAVAILABLE: &str = "backend_unavailable";
/// Persistence I/O failed.
pub const ERROR_STORE_UNAVAILABLE: &str = "store_unavailable";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
/// Request body failed validation.
pub const ERROR_BAD_REQUEST: &str = "bad_request";
