//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Server Defaults
// ============================================================================

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
/// Default header carrying the authenticated external identity.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";
/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
/// Default maximum accepted request body (webhook payloads included).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

// ============================================================================
// Quota Defaults
// ============================================================================

/// Default maximum successful consumptions per quota period.
pub const DEFAULT_DAILY_CEILING: u32 = 30;
/// Default bound on compare-and-swap attempts per consume call.
pub const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 32;

// ============================================================================
// Store Defaults
// ============================================================================

/// Default store backend ("memory" or "sql").
pub const DEFAULT_STORE_BACKEND: &str = "memory";
/// Default SQL pool size.
pub const DEFAULT_SQL_MAX_CONNECTIONS: u32 = 10;
/// Default SQL minimum idle connections.
pub const DEFAULT_SQL_MIN_CONNECTIONS: u32 = 1;
/// Default SQL acquire timeout in seconds.
pub const DEFAULT_SQL_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Default create-schema-on-start behaviour.
pub const DEFAULT_STORE_AUTO_MIGRATE: bool = false;

// ============================================================================
// Billing Defaults
// ============================================================================

/// Default payment provider API base URL.
pub const DEFAULT_BILLING_API_BASE: &str = "https://api.stripe.com";
/// Default webhook timestamp tolerance in seconds.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: u64 = 300;
/// Default outbound request timeout for the payment provider in seconds.
pub const DEFAULT_BILLING_TIMEOUT_SECS: u64 = 20;

// ============================================================================
// Generation Defaults
// ============================================================================

/// Default prompt sent to the generation backend.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate a dark humor motivational quote with light \
     profanity that may target military, police, firefighters, and customer service.";
/// Default generation request timeout in seconds.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
