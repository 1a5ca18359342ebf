//! Account storage.
//!
//! - [`AccountStore`] - data-access trait (implement this for new backends)
//! - [`MemoryStore`] - in-process map, for development and tests
//!
//! The SQL backend lives in [`crate::sql`] behind the `sql` feature.
//!
//! # Adding a new backend
//!
//! ```ignore
//! use quotagate_account::store::AccountStore;
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl AccountStore for MyStore {
//!     // find / find_by_email / find_by_customer / upsert_identity /
//!     // set_subscription / grant_manual / compare_and_swap_usage / list
//! }
//! ```

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::AccountStore;
