//! Shared fixtures for unit tests.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::account::{IdentityProfile, Usage, UserAccount};
use crate::error::GateError;
use crate::store::AccountStore;

/// Account with the given id and email, anchored at `last_reset`.
pub fn account(id: &str, email: &str, last_reset: OffsetDateTime) -> UserAccount {
    UserAccount::new(
        &IdentityProfile {
            external_id: id.into(),
            display_name: id.into(),
            email: email.into(),
        },
        last_reset,
    )
}

/// Store where every call fails with `StoreUnavailable`.
pub struct BrokenStore;

fn broken<T>() -> Result<T, GateError> {
    Err(GateError::store("disk on fire"))
}

#[async_trait]
impl AccountStore for BrokenStore {
    async fn find(&self, _: &str) -> Result<Option<UserAccount>, GateError> {
        broken()
    }

    async fn find_by_email(&self, _: &str) -> Result<Option<UserAccount>, GateError> {
        broken()
    }

    async fn find_by_customer(&self, _: &str) -> Result<Option<UserAccount>, GateError> {
        broken()
    }

    async fn upsert_identity(
        &self,
        _: &IdentityProfile,
        _: OffsetDateTime,
    ) -> Result<(UserAccount, bool), GateError> {
        broken()
    }

    async fn set_subscription(&self, _: &str, _: &str) -> Result<bool, GateError> {
        broken()
    }

    async fn grant_manual(&self, _: &str, _: OffsetDateTime) -> Result<bool, GateError> {
        broken()
    }

    async fn compare_and_swap_usage(
        &self,
        _: &str,
        _: &Usage,
        _: &Usage,
    ) -> Result<bool, GateError> {
        broken()
    }

    async fn list(&self) -> Result<Vec<UserAccount>, GateError> {
        broken()
    }
}
