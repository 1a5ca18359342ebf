//! Gate error taxonomy.

use quotagate_core::errors::*;

/// Every way a gate, ledger or webhook operation can fail.
///
/// Only [`GateError::StoreUnavailable`] is retryable; the rest are terminal
/// per-request outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No identity, or the identity has no account.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Valid identity without a paid entitlement.
    #[error("paid entitlement required")]
    EntitlementRequired,

    /// Ceiling reached for the current quota period.
    #[error("daily quota exceeded")]
    QuotaExceeded,

    /// Webhook authenticity check failed.
    #[error("invalid webhook signature: {0}")]
    SignatureInvalid(String),

    /// Webhook payload is not a provider event.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Downstream generation or payment call failed.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Persistence I/O failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl GateError {
    /// Create a store error from any error type.
    #[inline]
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::BackendUnavailable(err.to_string())
    }

    /// Whether the caller may retry the same request.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Stable label for metrics and JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => ERROR_UNAUTHENTICATED,
            Self::EntitlementRequired => ERROR_ENTITLEMENT_REQUIRED,
            Self::QuotaExceeded => ERROR_QUOTA_EXCEEDED,
            Self::SignatureInvalid(_) => ERROR_SIGNATURE_INVALID,
            Self::MalformedEvent(_) => ERROR_MALFORMED_EVENT,
            Self::BackendUnavailable(_) => ERROR_BACKEND_UNAVAILABLE,
            Self::StoreUnavailable(_) => ERROR_STORE_UNAVAILABLE,
        }
    }
}

#[cfg(feature = "sql")]
impl From<sqlx::Error> for GateError {
    fn from(err: sqlx::Error) -> Self {
        Self::store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_errors_are_retryable() {
        assert!(GateError::store("connection reset").is_retryable());
        assert!(!GateError::QuotaExceeded.is_retryable());
        assert!(!GateError::backend("timeout").is_retryable());
        assert!(!GateError::SignatureInvalid("mismatch".into()).is_retryable());
    }

    #[test]
    fn kinds_are_distinct() {
        let all = [
            GateError::Unauthenticated,
            GateError::EntitlementRequired,
            GateError::QuotaExceeded,
            GateError::SignatureInvalid(String::new()),
            GateError::MalformedEvent(String::new()),
            GateError::BackendUnavailable(String::new()),
            GateError::StoreUnavailable(String::new()),
        ];
        let mut kinds: Vec<_> = all.iter().map(GateError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), all.len());
    }
}
