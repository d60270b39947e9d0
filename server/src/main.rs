//! Message Gateway - Main Entry Point

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use wx_common::{Reply, RequestMessage};
use wx_server::{api, config, dispatch::Dispatcher, facade::MessageFacade};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wx_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        accounts = config.accounts.len(),
        "Starting message gateway"
    );

    let mut dispatcher = Dispatcher::with_timeout(config.reply_timeout);
    if config.echo_text {
        dispatcher = dispatcher.push(|message: Arc<RequestMessage>| async move {
            match message.as_ref() {
                RequestMessage::Text(text) => Some(Reply::text(&message, &text.content)),
                _ => None,
            }
        });
        info!("Echo handler enabled");
    }
    let dispatcher = Arc::new(dispatcher);

    let mut facades = Vec::with_capacity(config.accounts.len());
    for account in config.accounts.clone() {
        info!(
            account = account.account_id(),
            trust_mode = %account.trust_mode(),
            "Account configured"
        );
        facades.push(MessageFacade::new(account, Arc::clone(&dispatcher))?);
    }

    // Build router
    let app = api::create_router(api::AppState::new(facades));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
