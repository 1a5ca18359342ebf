//! Unified quotagate CLI.
//!
//! - `quotagate server` runs the HTTP gate
//! - `quotagate account` administers the account store (SQL backend)
//!
//! Each subcommand is also shipped as a standalone binary.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "quotagate",
    version,
    about = "Entitlement and daily usage quota gate",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gate.
    #[command(name = "server", alias = "serve")]
    Server(Box<quotagate_server::ServerArgs>),

    /// Inspect and administer accounts (SQL backend).
    #[command(name = "account")]
    Account(quotagate_account::AccountArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Server(args) => quotagate_server::cli::run(*args).await,
        Commands::Account(args) => quotagate_account::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_alias_parses() {
        let cli = Cli::try_parse_from(["quotagate", "serve", "--daily-ceiling", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Server(_)));
    }
}
