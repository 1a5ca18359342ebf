//! Entitlement ledger.
//!
//! Every entitlement write (subscription, manual grant, identity upsert) goes
//! through [`AccountLedger`]. Operations are idempotent so redelivered
//! provider events converge on the same state.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::account::{IdentityProfile, UserAccount};
use crate::error::GateError;
use crate::store::AccountStore;

/// Result of applying a provider event to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// State now reflects the event.
    Applied,
    /// No account matched. Acknowledged, nothing written.
    NoMatchingAccount,
    /// Event is logged only.
    Informational,
    /// Event kind is not handled.
    Ignored,
}

impl LedgerOutcome {
    /// Stable label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::NoMatchingAccount => "no_match",
            Self::Informational => "informational",
            Self::Ignored => "ignored",
        }
    }
}

/// Entitlement writes over a shared [`AccountStore`].
#[derive(Clone)]
pub struct AccountLedger {
    store: Arc<dyn AccountStore>,
}

impl AccountLedger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Underlying store, for read-only lookups.
    #[inline]
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Link a new subscription to the account owning `email`.
    ///
    /// A missing email or an unknown address is not an error: the event is
    /// acknowledged as [`LedgerOutcome::NoMatchingAccount`].
    pub async fn apply_subscription_created(
        &self,
        customer_id: &str,
        email: Option<&str>,
    ) -> Result<LedgerOutcome, GateError> {
        if customer_id.is_empty() {
            return Err(GateError::MalformedEvent(
                "subscription event without customer".into(),
            ));
        }

        let Some(email) = email.filter(|e| !e.is_empty()) else {
            warn!(customer_id, "subscription event carries no email, skipping");
            return Ok(LedgerOutcome::NoMatchingAccount);
        };

        let Some(account) = self.store.find_by_email(email).await? else {
            warn!(customer_id, email, "no account for subscription email");
            return Ok(LedgerOutcome::NoMatchingAccount);
        };

        if account.is_paying && account.stripe_customer_id.as_deref() == Some(customer_id) {
            debug!(external_id = %account.external_id, customer_id, "subscription already applied");
            return Ok(LedgerOutcome::Applied);
        }

        if !self
            .store
            .set_subscription(&account.external_id, customer_id)
            .await?
        {
            warn!(external_id = %account.external_id, "account removed before subscription write");
            return Ok(LedgerOutcome::NoMatchingAccount);
        }

        info!(external_id = %account.external_id, customer_id, "subscription linked");
        Ok(LedgerOutcome::Applied)
    }

    /// Record a successful payment. Never mutates state.
    pub async fn apply_payment_succeeded(
        &self,
        customer_id: &str,
    ) -> Result<LedgerOutcome, GateError> {
        match self.store.find_by_customer(customer_id).await? {
            Some(account) => {
                info!(external_id = %account.external_id, customer_id, "payment succeeded");
            }
            None => {
                info!(customer_id, "payment succeeded for unknown customer");
            }
        }
        Ok(LedgerOutcome::Informational)
    }

    /// Manual upgrade path, independent of the payment provider.
    pub async fn grant_manual_entitlement(&self, external_id: &str) -> Result<UserAccount, GateError> {
        self.grant_manual_entitlement_at(external_id, OffsetDateTime::now_utc())
            .await
    }

    /// [`grant_manual_entitlement`](Self::grant_manual_entitlement) with an
    /// explicit clock reading.
    pub async fn grant_manual_entitlement_at(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<UserAccount, GateError> {
        if external_id.is_empty() || !self.store.grant_manual(external_id, now).await? {
            return Err(GateError::Unauthenticated);
        }
        info!(external_id, "manual entitlement granted");
        self.store
            .find(external_id)
            .await?
            .ok_or(GateError::Unauthenticated)
    }

    /// Create the account on first login, otherwise refresh its profile.
    ///
    /// Returns the stored account and whether it was newly created.
    pub async fn upsert_identity(
        &self,
        profile: &IdentityProfile,
    ) -> Result<(UserAccount, bool), GateError> {
        if profile.external_id.is_empty() {
            return Err(GateError::Unauthenticated);
        }
        let (account, created) = self
            .store
            .upsert_identity(profile, OffsetDateTime::now_utc())
            .await?;
        if created {
            info!(external_id = %account.external_id, "account created");
        } else {
            debug!(external_id = %account.external_id, "profile refreshed");
        }
        Ok((account, created))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::account::Usage;
    use crate::store::MemoryStore;
    use crate::test_util::BrokenStore;

    fn account(id: &str, email: &str) -> UserAccount {
        UserAccount::new(
            &IdentityProfile {
                external_id: id.into(),
                display_name: id.into(),
                email: email.into(),
            },
            datetime!(2024-06-01 08:00 UTC),
        )
    }

    fn ledger_with(accounts: Vec<UserAccount>) -> (AccountLedger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_accounts(accounts));
        (AccountLedger::new(store.clone()), store)
    }

    #[tokio::test]
    async fn subscription_created_marks_paying() {
        let (ledger, store) = ledger_with(vec![account("u1", "a@x")]);
        let outcome = ledger
            .apply_subscription_created("cus_1", Some("a@x"))
            .await
            .unwrap();
        assert_eq!(outcome, LedgerOutcome::Applied);

        let stored = store.find("u1").await.unwrap().unwrap();
        assert!(stored.is_paying);
        assert_eq!(stored.stripe_customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn subscription_created_twice_is_idempotent() {
        let (ledger, store) = ledger_with(vec![account("u1", "a@x")]);
        ledger
            .apply_subscription_created("cus_1", Some("a@x"))
            .await
            .unwrap();
        let once = store.find("u1").await.unwrap().unwrap();

        let outcome = ledger
            .apply_subscription_created("cus_1", Some("a@x"))
            .await
            .unwrap();
        assert_eq!(outcome, LedgerOutcome::Applied);
        assert_eq!(store.find("u1").await.unwrap().unwrap(), once);
    }

    #[tokio::test]
    async fn subscription_for_unknown_email_creates_nothing() {
        let (ledger, store) = ledger_with(vec![account("u1", "a@x")]);
        let outcome = ledger
            .apply_subscription_created("cus_1", Some("stranger@x"))
            .await
            .unwrap();
        assert_eq!(outcome, LedgerOutcome::NoMatchingAccount);
        assert_eq!(store.len(), 1);
        assert!(!store.find("u1").await.unwrap().unwrap().is_paying);
    }

    #[tokio::test]
    async fn subscription_without_email_is_no_match() {
        let (ledger, _) = ledger_with(vec![]);
        assert_eq!(
            ledger.apply_subscription_created("cus_1", None).await.unwrap(),
            LedgerOutcome::NoMatchingAccount
        );
        assert_eq!(
            ledger
                .apply_subscription_created("cus_1", Some(""))
                .await
                .unwrap(),
            LedgerOutcome::NoMatchingAccount
        );
    }

    #[tokio::test]
    async fn subscription_without_customer_is_malformed() {
        let (ledger, _) = ledger_with(vec![account("u1", "a@x")]);
        let err = ledger
            .apply_subscription_created("", Some("a@x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::MalformedEvent(_)));
    }

    #[tokio::test]
    async fn payment_succeeded_never_mutates() {
        let mut paying = account("u1", "a@x");
        paying.is_paying = true;
        paying.stripe_customer_id = Some("cus_1".into());
        paying.daily_count = 7;
        let (ledger, store) = ledger_with(vec![paying.clone()]);

        for customer in ["cus_1", "cus_unknown"] {
            assert_eq!(
                ledger.apply_payment_succeeded(customer).await.unwrap(),
                LedgerOutcome::Informational
            );
        }
        assert_eq!(store.find("u1").await.unwrap().unwrap(), paying);
    }

    #[tokio::test]
    async fn manual_grant_resets_usage() {
        let mut used = account("u1", "a@x");
        used.daily_count = 12;
        let (ledger, _) = ledger_with(vec![used]);

        let now = datetime!(2024-06-02 10:00 UTC);
        let granted = ledger.grant_manual_entitlement_at("u1", now).await.unwrap();
        assert!(granted.is_paying);
        assert!(granted.manual_grant);
        assert_eq!(granted.usage(), Usage::reset(now));
    }

    #[tokio::test]
    async fn manual_grant_twice_same_state_except_timestamp() {
        let (ledger, _) = ledger_with(vec![account("u1", "a@x")]);
        let first = ledger
            .grant_manual_entitlement_at("u1", datetime!(2024-06-02 10:00 UTC))
            .await
            .unwrap();
        let second = ledger
            .grant_manual_entitlement_at("u1", datetime!(2024-06-02 11:00 UTC))
            .await
            .unwrap();
        assert_eq!(
            UserAccount {
                last_reset: first.last_reset,
                ..second
            },
            first
        );
    }

    #[tokio::test]
    async fn manual_grant_for_missing_account_is_unauthenticated() {
        let (ledger, _) = ledger_with(vec![]);
        assert_eq!(
            ledger.grant_manual_entitlement("ghost").await.unwrap_err(),
            GateError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn upsert_identity_reports_creation() {
        let (ledger, _) = ledger_with(vec![]);
        let profile = IdentityProfile {
            external_id: "google-1".into(),
            display_name: "Ada".into(),
            email: "ada@x".into(),
        };
        let (_, created) = ledger.upsert_identity(&profile).await.unwrap();
        assert!(created);
        let (account, created) = ledger.upsert_identity(&profile).await.unwrap();
        assert!(!created);
        assert!(!account.is_paying);
    }

    #[tokio::test]
    async fn store_failures_are_not_lookup_misses() {
        let ledger = AccountLedger::new(Arc::new(BrokenStore));
        let err = ledger
            .apply_subscription_created("cus_1", Some("a@x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(ledger.apply_payment_succeeded("cus_1").await.unwrap_err().is_retryable());
    }
}
