//! quotagate account standalone binary.

use std::process::ExitCode;

use clap::Parser;
use quotagate_account::{AccountArgs, cli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = AccountArgs::parse();

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
