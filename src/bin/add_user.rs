use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use account_service::*;

/// Register a user directly against a database file
#[derive(Parser, Debug)]
#[command(name = "add_user")]
struct Args {
    /// SQLite database path
    #[arg(long, default_value = "accounts.sqlite3", env = "ACCOUNTS_DB")]
    db : PathBuf,

    username : String,
    email :    String,
    password : String,
}

async fn run(args : Args) -> Result<models::Id> {
    api::check_registration(&args.username, &args.email, &args.password)?;

    let accounts = service::Accounts::new(Arc::new(database::Db::new(&args.db)?));

    accounts
        .register(&args.username, &args.email, &args.password)
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    cli::init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(id) => {
            println!("{}", id);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "could not add user");
            ExitCode::FAILURE
        }
    }
}
