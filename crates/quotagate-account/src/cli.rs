//! CLI module for quotagate-account.
//!
//! Administers accounts in a SQL store. Usable as the standalone
//! `quotagate-account` binary or as `quotagate account`.
//!
//! # Usage
//!
//! ```bash
//! # Initialize database schema
//! quotagate-account init -d sqlite:accounts.db?mode=rwc
//!
//! # List accounts
//! quotagate-account list -d sqlite:accounts.db
//!
//! # Grant paid access without the payment provider
//! quotagate-account grant -d sqlite:accounts.db -u google-123
//!
//! # Start a fresh quota period for one account
//! quotagate-account reset-usage -d sqlite:accounts.db -u google-123
//!
//! # Sign a webhook payload for manual delivery
//! quotagate-account sign --secret whsec_... event.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use quotagate_core::defaults::{DEFAULT_DAILY_CEILING, DEFAULT_WEBHOOK_TOLERANCE_SECS};
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::account::UserAccount;
use crate::gate::{QuotaPolicy, UsageGate};
use crate::ledger::AccountLedger;
use crate::sql::{SqlStore, SqlStoreConfig};
use crate::store::AccountStore;
use crate::webhook::SignatureVerifier;

/// Account management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "quotagate-account",
    version,
    about = "Manage quotagate accounts"
)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommands,
}

/// Output format for listing commands.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Account CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommands {
    /// Initialize database schema.
    Init {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// List all accounts.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show one account with its quota status.
    Show {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// External identity of the account.
        #[arg(short, long)]
        user_id: String,

        /// Daily ceiling used to compute the remaining quota.
        #[arg(long, default_value_t = DEFAULT_DAILY_CEILING)]
        daily_ceiling: u32,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Grant paid access manually (resets today's usage).
    Grant {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// External identity of the account.
        #[arg(short, long)]
        user_id: String,
    },

    /// Reset usage for an account.
    ResetUsage {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// External identity of the account.
        #[arg(short, long)]
        user_id: String,
    },

    /// Print a signature header for a webhook payload.
    Sign {
        /// Webhook signing secret.
        #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,

        /// Unix timestamp to sign at (default: now).
        #[arg(long)]
        timestamp: Option<i64>,

        /// File containing the exact payload bytes.
        payload: PathBuf,
    },
}

/// Account row for display.
#[derive(Tabled)]
struct AccountDisplay {
    #[tabled(rename = "External ID")]
    external_id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Paying")]
    paying: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Used Today")]
    daily_count: u32,
    #[tabled(rename = "Last Reset")]
    last_reset: String,
}

impl From<&UserAccount> for AccountDisplay {
    fn from(a: &UserAccount) -> Self {
        Self {
            external_id: a.external_id.clone(),
            email: a.email.clone(),
            paying: if a.is_paying { "Yes" } else { "No" }.to_string(),
            source: a
                .entitlement_source()
                .map_or_else(|| "-".to_string(), |s| format!("{s:?}")),
            daily_count: a.daily_count,
            last_reset: format_time(a.last_reset),
        }
    }
}

/// Run the account CLI with the given arguments.
///
/// This is the main entry point for the account CLI, used by both the
/// standalone binary and the unified quotagate CLI.
pub async fn run(args: AccountArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AccountCommands::Init { database } => {
            connect(&database).await?.migrate().await?;
            println!("Database schema initialized successfully.");
            Ok(())
        }
        AccountCommands::List { database, format } => {
            let store = connect(&database).await?;
            print_accounts(&store.list().await?, format)
        }
        AccountCommands::Show {
            database,
            user_id,
            daily_ceiling,
            format,
        } => show_account(&database, &user_id, daily_ceiling, format).await,
        AccountCommands::Grant { database, user_id } => {
            let ledger = AccountLedger::new(Arc::new(connect(&database).await?));
            let account = ledger.grant_manual_entitlement(&user_id).await?;
            println!("Entitlement granted.");
            println!("  External ID: {}", account.external_id);
            println!("  Last reset: {}", format_time(account.last_reset));
            Ok(())
        }
        AccountCommands::ResetUsage { database, user_id } => {
            let gate = UsageGate::new(Arc::new(connect(&database).await?), QuotaPolicy::default());
            let account = gate
                .reset_usage_at(&user_id, OffsetDateTime::now_utc())
                .await?;
            println!("Usage reset for {}.", account.external_id);
            Ok(())
        }
        AccountCommands::Sign {
            secret,
            timestamp,
            payload,
        } => {
            let body = std::fs::read(&payload)?;
            let verifier = SignatureVerifier::new(
                secret.as_bytes(),
                Duration::from_secs(DEFAULT_WEBHOOK_TOLERANCE_SECS),
            )
            .map_err(|e| e.to_string())?;
            let ts = timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
            println!("{}", verifier.sign(&body, ts));
            Ok(())
        }
    }
}

/// Connect to database.
async fn connect(url: &str) -> Result<SqlStore, Box<dyn std::error::Error>> {
    let store = SqlStore::connect(SqlStoreConfig::new(url).max_connections(1)).await?;
    Ok(store)
}

async fn show_account(
    url: &str,
    user_id: &str,
    daily_ceiling: u32,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn AccountStore> = Arc::new(connect(url).await?);
    let Some(account) = store.find(user_id).await? else {
        return Err(format!("no account with external id {user_id}").into());
    };
    let gate = UsageGate::new(
        store,
        QuotaPolicy {
            daily_ceiling,
            ..QuotaPolicy::default()
        },
    );
    let status = gate.status(user_id).await?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "account": account, "quota": status });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            println!("{}", Table::new([AccountDisplay::from(&account)]));
            println!(
                "Quota: {}/{} used, {} remaining",
                status.daily_count, status.ceiling, status.remaining
            );
        }
    }
    Ok(())
}

fn print_accounts(
    accounts: &[UserAccount],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(accounts)?),
        OutputFormat::Table if accounts.is_empty() => println!("No accounts found."),
        OutputFormat::Table => {
            let rows: Vec<AccountDisplay> = accounts.iter().map(AccountDisplay::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

fn format_time(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AccountArgs {
        AccountArgs::try_parse_from(std::iter::once("quotagate-account").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn parses_subcommands() {
        let args = parse(&["list", "-d", "sqlite::memory:", "--format", "json"]);
        assert!(matches!(
            args.command,
            AccountCommands::List {
                format: OutputFormat::Json,
                ..
            }
        ));

        let args = parse(&["reset-usage", "-d", "sqlite::memory:", "-u", "g-1"]);
        assert!(matches!(args.command, AccountCommands::ResetUsage { ref user_id, .. } if user_id == "g-1"));

        let args = parse(&["show", "-d", "x", "-u", "g-1"]);
        assert!(matches!(
            args.command,
            AccountCommands::Show {
                daily_ceiling: DEFAULT_DAILY_CEILING,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn init_grant_and_reset_against_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("accounts.db").display());

        run(parse(&["init", "-d", &url])).await.unwrap();

        let store = connect(&url).await.unwrap();
        store
            .upsert_identity(
                &crate::IdentityProfile {
                    external_id: "g-1".into(),
                    display_name: "Ada".into(),
                    email: "ada@x".into(),
                },
                OffsetDateTime::now_utc(),
            )
            .await
            .unwrap();
        store.close().await;

        run(parse(&["grant", "-d", &url, "-u", "g-1"])).await.unwrap();
        run(parse(&["reset-usage", "-d", &url, "-u", "g-1"])).await.unwrap();
        run(parse(&["list", "-d", &url])).await.unwrap();
        run(parse(&["show", "-d", &url, "-u", "g-1", "-f", "json"]))
            .await
            .unwrap();

        let store = connect(&url).await.unwrap();
        let account = store.find("g-1").await.unwrap().unwrap();
        assert!(account.is_paying);
        assert!(account.manual_grant);
        assert_eq!(account.daily_count, 0);

        assert!(run(parse(&["grant", "-d", &url, "-u", "ghost"])).await.is_err());
    }

    #[tokio::test]
    async fn sign_reads_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, br#"{"id":"evt_1"}"#).unwrap();
        let path = path.to_string_lossy().into_owned();
        run(parse(&["sign", "--secret", "whsec_x", "--timestamp", "1700000000", &path]))
            .await
            .unwrap();
    }
}
