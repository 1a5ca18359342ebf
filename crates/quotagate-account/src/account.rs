//! User account record shared by every store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identity attributes yielded by the identity provider on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Stable identity-provider id.
    pub external_id: String,
    pub display_name: String,
    pub email: String,
}

/// Where a paid entitlement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementSource {
    /// Payment-provider subscription (customer reference present).
    Subscription,
    /// Manual upgrade, independent of the payment provider.
    ManualGrant,
}

/// Usage counter for the current quota period.
///
/// Stores compare-and-swap this pair as one unit, so a writer can name the
/// exact state it expects to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub daily_count: u32,
    pub last_reset: OffsetDateTime,
}

impl Usage {
    /// A fresh period anchored at `now`.
    #[inline]
    pub fn reset(now: OffsetDateTime) -> Self {
        Self {
            daily_count: 0,
            last_reset: now,
        }
    }

    /// The same period with one more unit consumed.
    #[inline]
    pub fn incremented(self) -> Self {
        Self {
            daily_count: self.daily_count.saturating_add(1),
            last_reset: self.last_reset,
        }
    }
}

/// One user's entitlement and usage state.
///
/// Values are owned snapshots; stores never hand out references into their
/// internal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    /// Payment-provider customer reference, set by the first subscription.
    pub stripe_customer_id: Option<String>,
    pub is_paying: bool,
    /// Entitlement was granted through the manual upgrade path.
    pub manual_grant: bool,
    pub daily_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_reset: OffsetDateTime,
}

impl UserAccount {
    /// Account state on first login: not paying, nothing consumed.
    pub fn new(profile: &IdentityProfile, now: OffsetDateTime) -> Self {
        Self {
            external_id: profile.external_id.clone(),
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            stripe_customer_id: None,
            is_paying: false,
            manual_grant: false,
            daily_count: 0,
            last_reset: now,
        }
    }

    #[inline]
    pub fn usage(&self) -> Usage {
        Usage {
            daily_count: self.daily_count,
            last_reset: self.last_reset,
        }
    }

    /// Source of the current entitlement, if any.
    ///
    /// A subscription wins over a manual grant when both are present.
    pub fn entitlement_source(&self) -> Option<EntitlementSource> {
        if !self.is_paying {
            return None;
        }
        if self.stripe_customer_id.is_some() {
            Some(EntitlementSource::Subscription)
        } else if self.manual_grant {
            Some(EntitlementSource::ManualGrant)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn profile() -> IdentityProfile {
        IdentityProfile {
            external_id: "google-123".into(),
            display_name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn new_account_is_not_paying() {
        let now = datetime!(2024-03-01 10:00 UTC);
        let account = UserAccount::new(&profile(), now);
        assert!(!account.is_paying);
        assert_eq!(account.daily_count, 0);
        assert_eq!(account.last_reset, now);
        assert_eq!(account.entitlement_source(), None);
    }

    #[test]
    fn entitlement_sources_are_distinguishable() {
        let mut account = UserAccount::new(&profile(), datetime!(2024-03-01 10:00 UTC));
        account.is_paying = true;
        account.manual_grant = true;
        assert_eq!(
            account.entitlement_source(),
            Some(EntitlementSource::ManualGrant)
        );

        account.stripe_customer_id = Some("cus_1".into());
        assert_eq!(
            account.entitlement_source(),
            Some(EntitlementSource::Subscription)
        );
    }

    #[test]
    fn usage_increment_keeps_anchor() {
        let anchor = datetime!(2024-03-01 00:00:05 UTC);
        let usage = Usage::reset(anchor).incremented().incremented();
        assert_eq!(usage.daily_count, 2);
        assert_eq!(usage.last_reset, anchor);
    }

    #[test]
    fn account_serializes_rfc3339_timestamp() {
        let account = UserAccount::new(&profile(), datetime!(2024-03-01 10:00 UTC));
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["last_reset"], "2024-03-01T10:00:00Z");
        assert_eq!(json["is_paying"], false);
    }
}
