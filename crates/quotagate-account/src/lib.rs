//! Entitlement ledger and usage gate for quotagate.
//!
//! - [`UsageGate`] decides whether a caller may spend one unit of the
//!   metered capability and records the spend.
//! - [`AccountLedger`] owns every entitlement write.
//! - [`WebhookIngestor`] turns payment-provider events into ledger calls.
//! - [`AccountStore`] is the persistence seam, with in-memory and SQL
//!   backends.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quotagate_account::{
//!     AccountLedger, GateError, IdentityProfile, MemoryStore, QuotaPolicy, UsageGate,
//! };
//!
//! # async fn example() -> Result<(), GateError> {
//! let store = Arc::new(MemoryStore::new());
//! let ledger = AccountLedger::new(store.clone());
//! let gate = UsageGate::new(store, QuotaPolicy::default());
//!
//! let profile = IdentityProfile {
//!     external_id: "google-123".into(),
//!     display_name: "Ada".into(),
//!     email: "ada@example.com".into(),
//! };
//! ledger.upsert_identity(&profile).await?;
//! ledger.grant_manual_entitlement("google-123").await?;
//!
//! let consumed = gate.try_consume("google-123").await?;
//! assert_eq!(consumed.remaining, 29);
//! # Ok(())
//! # }
//! ```

mod account;
pub mod clock;
mod error;
mod gate;
mod ledger;
pub mod store;
pub mod webhook;

#[cfg(feature = "sql")]
pub mod cli;
#[cfg(feature = "sql")]
pub mod sql;

#[cfg(test)]
mod test_util;

pub use account::{EntitlementSource, IdentityProfile, Usage, UserAccount};
#[cfg(feature = "sql")]
pub use cli::AccountArgs;
pub use clock::{QUOTA_ZONE, should_reset};
pub use error::GateError;
pub use gate::{Consumed, QuotaPolicy, QuotaStatus, UsageGate};
pub use ledger::{AccountLedger, LedgerOutcome};
pub use store::{AccountStore, MemoryStore};
pub use webhook::{Ack, SignatureVerifier, WebhookIngestor};
