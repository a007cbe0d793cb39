use std::sync::Arc;

use clap::Parser;
use issue_hook::app_state::AppState;
use issue_hook::config::Cli;
use issue_hook::{router, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(cli.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    let app_state = Arc::new(AppState::from_cli(&cli)?);
    if app_state.store().is_none() {
        tracing::error!(
            "SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY is not set, deliveries will be answered with 500"
        );
    }

    let listener = TcpListener::bind(&cli.listen).await?;
    tracing::info!(listen = %cli.listen, "Listening for webhooks");

    axum::serve(listener, router(app_state)).await?;

    Ok(())
}
