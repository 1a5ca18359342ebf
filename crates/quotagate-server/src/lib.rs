//! quotagate HTTP server.
//!
//! Wires the account crate's [`UsageGate`](quotagate_account::UsageGate),
//! [`AccountLedger`](quotagate_account::AccountLedger) and
//! [`WebhookIngestor`](quotagate_account::WebhookIngestor) to an axum router.
//! Exposed as a library for integration tests and embedding.

pub mod api;
pub mod backend;
pub mod cli;
mod error;
mod server;
mod state;

pub use cli::ServerArgs;
pub use error::ServerError;
pub use server::{DEFAULT_SHUTDOWN_TIMEOUT, open_store, run, run_with_shutdown, serve};
pub use state::AppState;
pub use tokio_util::sync::CancellationToken;
