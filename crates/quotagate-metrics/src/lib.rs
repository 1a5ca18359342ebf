//! Metrics collection and Prometheus exporter for quotagate.
//!
//! Counters cover consume outcomes, webhook deliveries and generation
//! backend health. Labels reuse the error kind constants from
//! `quotagate_core` so dashboards line up with HTTP error bodies.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Consume attempts by result ("ok" or an error kind).
pub const CONSUME_TOTAL: &str = "quotagate_consume_total";
/// Webhook deliveries by event kind and outcome.
pub const WEBHOOK_EVENTS_TOTAL: &str = "quotagate_webhook_events_total";
/// Manual entitlement grants.
pub const MANUAL_GRANTS_TOTAL: &str = "quotagate_manual_grants_total";
/// Identity logins (account created or refreshed).
pub const IDENTITY_LOGINS_TOTAL: &str = "quotagate_identity_logins_total";
/// Subscriptions created through the billing endpoint.
pub const SUBSCRIPTIONS_CREATED_TOTAL: &str = "quotagate_subscriptions_created_total";
/// Generation backend failures after a quota unit was spent.
pub const GENERATION_FAILURES_TOTAL: &str = "quotagate_generation_failures_total";
/// Generation backend latency histogram (seconds).
pub const GENERATION_DURATION_SECONDS: &str = "quotagate_generation_duration_seconds";
/// Total number of errors by kind.
pub const ERRORS_TOTAL: &str = "quotagate_errors_total";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a consume attempt outcome.
#[inline]
pub fn record_consume(result: &'static str) {
    counter!(CONSUME_TOTAL, "result" => result).increment(1);
}

/// Record a webhook delivery.
///
/// `kind` is the provider event type; unknown kinds are folded into
/// "other" to keep label cardinality bounded.
#[inline]
pub fn record_webhook_event(kind: &'static str, outcome: &'static str) {
    counter!(WEBHOOK_EVENTS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record a manual entitlement grant.
#[inline]
pub fn record_manual_grant() {
    counter!(MANUAL_GRANTS_TOTAL).increment(1);
}

/// Record an identity login.
#[inline]
pub fn record_identity_login(created: bool) {
    let label = if created { "created" } else { "updated" };
    counter!(IDENTITY_LOGINS_TOTAL, "result" => label).increment(1);
}

/// Record a subscription created through the billing endpoint.
#[inline]
pub fn record_subscription_created() {
    counter!(SUBSCRIPTIONS_CREATED_TOTAL).increment(1);
}

/// Record a generation backend call.
#[inline]
pub fn record_generation(duration_secs: f64, ok: bool) {
    histogram!(GENERATION_DURATION_SECONDS).record(duration_secs);
    if !ok {
        counter!(GENERATION_FAILURES_TOTAL).increment(1);
    }
}

/// Record an error by kind.
#[inline]
pub fn record_error(error_kind: &'static str) {
    counter!(ERRORS_TOTAL, "type" => error_kind).increment(1);
}

// ============================================================================
// Error Kind Constants (re-exported from quotagate-core)
// ============================================================================

pub use quotagate_core::{
    ERROR_BACKEND_UNAVAILABLE, ERROR_BAD_REQUEST, ERROR_CONFIG, ERROR_ENTITLEMENT_REQUIRED,
    ERROR_MALFORMED_EVENT, ERROR_QUOTA_EXCEEDED, ERROR_SIGNATURE_INVALID, ERROR_STORE_UNAVAILABLE,
    ERROR_UNAUTHENTICATED,
};
