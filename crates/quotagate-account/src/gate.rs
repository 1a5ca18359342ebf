//! Usage gate: entitlement check plus per-user daily quota.
//!
//! One consume is an ordered pipeline over a fresh snapshot:
//! load, entitlement check, period reset, ceiling check, increment. Both
//! writes are compare-and-swap on the `(daily_count, last_reset)` pair; a lost
//! race restarts the pipeline from a new snapshot.

use std::sync::Arc;

use quotagate_core::defaults::{DEFAULT_DAILY_CEILING, DEFAULT_MAX_UPDATE_ATTEMPTS};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::account::{Usage, UserAccount};
use crate::clock::should_reset;
use crate::error::GateError;
use crate::store::AccountStore;

/// Quota parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Maximum successful consumptions per quota period.
    pub daily_ceiling: u32,
    /// Compare-and-swap attempts before giving up with a retryable error.
    pub max_update_attempts: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            daily_ceiling: DEFAULT_DAILY_CEILING,
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }
}

/// A successful consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Consumed {
    /// Units left in the current period.
    pub remaining: u32,
    /// Units used in the current period, this one included.
    pub daily_count: u32,
}

/// Read-only quota view for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub is_paying: bool,
    pub daily_count: u32,
    pub ceiling: u32,
    pub remaining: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_reset: OffsetDateTime,
}

/// Gate in front of the metered capability.
#[derive(Clone)]
pub struct UsageGate {
    store: Arc<dyn AccountStore>,
    policy: QuotaPolicy,
}

impl UsageGate {
    pub fn new(store: Arc<dyn AccountStore>, policy: QuotaPolicy) -> Self {
        Self { store, policy }
    }

    #[inline]
    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Spend one unit of the caller's daily quota.
    ///
    /// The unit is spent as soon as this returns `Ok`; it is not refunded if
    /// the caller's downstream work fails.
    pub async fn try_consume(&self, external_id: &str) -> Result<Consumed, GateError> {
        self.try_consume_at(external_id, OffsetDateTime::now_utc())
            .await
    }

    /// [`try_consume`](Self::try_consume) with an explicit clock reading.
    pub async fn try_consume_at(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<Consumed, GateError> {
        let ceiling = self.policy.daily_ceiling;

        for attempt in 0..self.policy.max_update_attempts {
            let account = self.load(external_id).await?;
            if !account.is_paying {
                return Err(GateError::EntitlementRequired);
            }

            let mut current = account.usage();
            if should_reset(current.last_reset, now) {
                let fresh = Usage::reset(now);
                if !self
                    .store
                    .compare_and_swap_usage(external_id, &current, &fresh)
                    .await?
                {
                    trace!(external_id, attempt, "period reset lost race");
                    continue;
                }
                debug!(external_id, "quota period reset");
                // The stored usage is now exactly `fresh`.
                current = fresh;
            }

            if current.daily_count >= ceiling {
                return Err(GateError::QuotaExceeded);
            }

            let next = current.incremented();
            if self
                .store
                .compare_and_swap_usage(external_id, &current, &next)
                .await?
            {
                return Ok(Consumed {
                    remaining: ceiling.saturating_sub(next.daily_count),
                    daily_count: next.daily_count,
                });
            }
            trace!(external_id, attempt, "usage update lost race");
        }

        Err(GateError::store("usage update contention"))
    }

    /// Current quota view. A stale period reads as zero usage; nothing is
    /// written.
    pub async fn status(&self, external_id: &str) -> Result<QuotaStatus, GateError> {
        self.status_at(external_id, OffsetDateTime::now_utc()).await
    }

    pub async fn status_at(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<QuotaStatus, GateError> {
        let account = self.load(external_id).await?;
        let daily_count = if should_reset(account.last_reset, now) {
            0
        } else {
            account.daily_count
        };
        let ceiling = self.policy.daily_ceiling;
        let remaining = if account.is_paying {
            ceiling.saturating_sub(daily_count)
        } else {
            0
        };

        Ok(QuotaStatus {
            is_paying: account.is_paying,
            daily_count,
            ceiling,
            remaining,
            last_reset: account.last_reset,
        })
    }

    /// Start a fresh period for one account (admin operation).
    pub async fn reset_usage_at(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<UserAccount, GateError> {
        for _ in 0..self.policy.max_update_attempts {
            let account = self.load(external_id).await?;
            let fresh = Usage::reset(now);
            if self
                .store
                .compare_and_swap_usage(external_id, &account.usage(), &fresh)
                .await?
            {
                debug!(external_id, "usage reset");
                return self.load(external_id).await;
            }
        }
        Err(GateError::store("usage update contention"))
    }

    async fn load(&self, external_id: &str) -> Result<UserAccount, GateError> {
        if external_id.is_empty() {
            return Err(GateError::Unauthenticated);
        }
        self.store
            .find(external_id)
            .await?
            .ok_or(GateError::Unauthenticated)
    }
}
