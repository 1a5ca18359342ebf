//! In-memory account store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::account::{IdentityProfile, Usage, UserAccount};
use crate::error::GateError;

use super::traits::AccountStore;

/// Account store backed by a mutex-guarded map.
///
/// Suitable for development and tests. State is lost on restart. Every
/// operation completes inside one synchronous critical section, so the lock
/// is never held across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, UserAccount>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with accounts.
    pub fn with_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = UserAccount>,
    {
        let accounts = accounts
            .into_iter()
            .map(|a| (a.external_id.clone(), a))
            .collect();
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    /// Number of stored accounts.
    #[inline]
    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Check if no accounts are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.accounts.lock().is_empty()
    }

    /// Lowest-keyed account matching the predicate.
    fn find_first<F>(&self, pred: F) -> Option<UserAccount>
    where
        F: Fn(&UserAccount) -> bool,
    {
        self.accounts
            .lock()
            .values()
            .filter(|a| pred(a))
            .min_by(|a, b| a.external_id.cmp(&b.external_id))
            .cloned()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find(&self, external_id: &str) -> Result<Option<UserAccount>, GateError> {
        Ok(self.accounts.lock().get(external_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, GateError> {
        Ok(self.find_first(|a| a.email == email))
    }

    async fn find_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<UserAccount>, GateError> {
        Ok(self.find_first(|a| a.stripe_customer_id.as_deref() == Some(customer_id)))
    }

    async fn upsert_identity(
        &self,
        profile: &IdentityProfile,
        now: OffsetDateTime,
    ) -> Result<(UserAccount, bool), GateError> {
        let mut map = self.accounts.lock();
        match map.get_mut(&profile.external_id) {
            Some(account) => {
                account.display_name.clone_from(&profile.display_name);
                account.email.clone_from(&profile.email);
                Ok((account.clone(), false))
            }
            None => {
                let account = UserAccount::new(profile, now);
                map.insert(account.external_id.clone(), account.clone());
                Ok((account, true))
            }
        }
    }

    async fn set_subscription(
        &self,
        external_id: &str,
        customer_id: &str,
    ) -> Result<bool, GateError> {
        let mut map = self.accounts.lock();
        let Some(account) = map.get_mut(external_id) else {
            return Ok(false);
        };
        account.stripe_customer_id = Some(customer_id.to_string());
        account.is_paying = true;
        Ok(true)
    }

    async fn grant_manual(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<bool, GateError> {
        let mut map = self.accounts.lock();
        let Some(account) = map.get_mut(external_id) else {
            return Ok(false);
        };
        account.is_paying = true;
        account.manual_grant = true;
        account.daily_count = 0;
        account.last_reset = now;
        Ok(true)
    }

    async fn compare_and_swap_usage(
        &self,
        external_id: &str,
        expected: &Usage,
        new: &Usage,
    ) -> Result<bool, GateError> {
        let mut map = self.accounts.lock();
        match map.get_mut(external_id) {
            Some(account) if account.usage() == *expected => {
                account.daily_count = new.daily_count;
                account.last_reset = new.last_reset;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<UserAccount>, GateError> {
        let mut accounts: Vec<_> = self.accounts.lock().values().cloned().collect();
        accounts.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn profile(id: &str, email: &str) -> IdentityProfile {
        IdentityProfile {
            external_id: id.into(),
            display_name: format!("user {id}"),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let store = MemoryStore::new();
        let now = datetime!(2024-01-01 09:00 UTC);

        let (created, was_created) = store
            .upsert_identity(&profile("u1", "a@example.com"), now)
            .await
            .unwrap();
        assert!(was_created);
        assert_eq!(created.last_reset, now);

        let later = datetime!(2024-01-02 09:00 UTC);
        let (updated, was_created) = store
            .upsert_identity(&profile("u1", "b@example.com"), later)
            .await
            .unwrap();
        assert!(!was_created);
        assert_eq!(updated.email, "b@example.com");
        // Login never touches usage.
        assert_eq!(updated.last_reset, now);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn cas_rejects_stale_expectation() {
        let now = datetime!(2024-01-01 09:00 UTC);
        let store = MemoryStore::with_accounts([UserAccount::new(&profile("u1", "a@x"), now)]);

        let current = Usage::reset(now);
        let next = current.incremented();
        assert!(store.compare_and_swap_usage("u1", &current, &next).await.unwrap());
        // Second writer still expects the old state.
        assert!(!store.compare_and_swap_usage("u1", &current, &next).await.unwrap());
        assert_eq!(store.find("u1").await.unwrap().unwrap().daily_count, 1);
    }

    #[tokio::test]
    async fn cas_on_missing_account_is_false() {
        let store = MemoryStore::new();
        let usage = Usage::reset(datetime!(2024-01-01 00:00 UTC));
        assert!(!store.compare_and_swap_usage("nobody", &usage, &usage).await.unwrap());
    }

    #[tokio::test]
    async fn email_lookup_prefers_lowest_id() {
        let now = datetime!(2024-01-01 09:00 UTC);
        let store = MemoryStore::with_accounts([
            UserAccount::new(&profile("u2", "shared@x"), now),
            UserAccount::new(&profile("u1", "shared@x"), now),
        ]);
        let found = store.find_by_email("shared@x").await.unwrap().unwrap();
        assert_eq!(found.external_id, "u1");
        assert!(store.find_by_email("none@x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let now = datetime!(2024-01-01 09:00 UTC);
        let store = MemoryStore::with_accounts([
            UserAccount::new(&profile("b", "b@x"), now),
            UserAccount::new(&profile("a", "a@x"), now),
        ]);
        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.external_id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
