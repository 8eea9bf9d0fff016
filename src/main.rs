use std::sync::Arc;

use clap::Parser;

use account_service::{api, cli, service};

#[tokio::main]
async fn main() -> account_service::Result<()> {
    cli::init_tracing();

    let args = cli::Cli::parse();

    let server = Arc::new(service::Accounts::new(args.open_store()?));

    let (addr, serve) = warp::serve(api::routes(&server))
        .try_bind_with_graceful_shutdown(args.listen, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for ctrl-c");
            }
        })?;

    tracing::info!(%addr, backend = ?args.backend, "listening");

    serve.await;

    tracing::info!("shut down");

    Ok(())
}
