//! Data-access trait for account stores.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::account::{IdentityProfile, Usage, UserAccount};
use crate::error::GateError;

/// Durable keyed storage for [`UserAccount`] records.
///
/// Implementations only move data. Business rules live in
/// [`AccountLedger`](crate::AccountLedger) and [`UsageGate`](crate::UsageGate),
/// which are the only callers allowed to mutate accounts.
///
/// Return `Ok(None)` / `Ok(false)` when a key is missing. I/O failures must
/// surface as [`GateError::StoreUnavailable`], never as a missing record.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by external identity.
    async fn find(&self, external_id: &str) -> Result<Option<UserAccount>, GateError>;

    /// Look up an account by contact email. When several accounts share the
    /// address, the lowest external id wins.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, GateError>;

    /// Look up an account by payment-provider customer reference.
    async fn find_by_customer(&self, customer_id: &str)
    -> Result<Option<UserAccount>, GateError>;

    /// Create the account on first login, or refresh name and email.
    ///
    /// Returns the stored account and whether it was created.
    async fn upsert_identity(
        &self,
        profile: &IdentityProfile,
        now: OffsetDateTime,
    ) -> Result<(UserAccount, bool), GateError>;

    /// Attach a customer reference and mark the account paying.
    async fn set_subscription(
        &self,
        external_id: &str,
        customer_id: &str,
    ) -> Result<bool, GateError>;

    /// Mark the account paying via manual grant and start a fresh period.
    async fn grant_manual(&self, external_id: &str, now: OffsetDateTime)
    -> Result<bool, GateError>;

    /// Replace the usage pair only if it still equals `expected`.
    ///
    /// Returns `false` when another writer got there first (or the account
    /// is gone). This is the single linearization point for usage updates.
    async fn compare_and_swap_usage(
        &self,
        external_id: &str,
        expected: &Usage,
        new: &Usage,
    ) -> Result<bool, GateError>;

    /// All accounts ordered by external id.
    async fn list(&self) -> Result<Vec<UserAccount>, GateError>;
}

/// Generates the forwarding impl for smart pointers around a store.
macro_rules! forward_store {
    ($ptr:ident) => {
        #[async_trait]
        impl<S: AccountStore + ?Sized> AccountStore for $ptr<S> {
            #[inline]
            async fn find(&self, external_id: &str) -> Result<Option<UserAccount>, GateError> {
                (**self).find(external_id).await
            }

            #[inline]
            async fn find_by_email(
                &self,
                email: &str,
            ) -> Result<Option<UserAccount>, GateError> {
                (**self).find_by_email(email).await
            }

            #[inline]
            async fn find_by_customer(
                &self,
                customer_id: &str,
            ) -> Result<Option<UserAccount>, GateError> {
                (**self).find_by_customer(customer_id).await
            }

            #[inline]
            async fn upsert_identity(
                &self,
                profile: &IdentityProfile,
                now: OffsetDateTime,
            ) -> Result<(UserAccount, bool), GateError> {
                (**self).upsert_identity(profile, now).await
            }

            #[inline]
            async fn set_subscription(
                &self,
                external_id: &str,
                customer_id: &str,
            ) -> Result<bool, GateError> {
                (**self).set_subscription(external_id, customer_id).await
            }

            #[inline]
            async fn grant_manual(
                &self,
                external_id: &str,
                now: OffsetDateTime,
            ) -> Result<bool, GateError> {
                (**self).grant_manual(external_id, now).await
            }

            #[inline]
            async fn compare_and_swap_usage(
                &self,
                external_id: &str,
                expected: &Usage,
                new: &Usage,
            ) -> Result<bool, GateError> {
                (**self)
                    .compare_and_swap_usage(external_id, expected, new)
                    .await
            }

            #[inline]
            async fn list(&self) -> Result<Vec<UserAccount>, GateError> {
                (**self).list().await
            }
        }
    };
}

forward_store!(Arc);
forward_store!(Box);
