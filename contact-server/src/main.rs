//! Contact server - accepts contact form submissions and relays them by email.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contact::{web, AppState, Config, Notifier, SmtpMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("contact_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        email_user_set = config.email_user.is_some(),
        email_pass_set = config.email_pass.is_some(),
        receiver_email_set = config.receiver_email.is_some(),
        dispatch_mode = %config.dispatch_mode,
        cors = ?config.cors,
        "config_loaded"
    );

    // Create the shared relay transport
    let mailer = SmtpMailer::from_config(&config).context("Failed to configure SMTP relay")?;
    let notifier =
        Notifier::new(&config, Arc::new(mailer)).context("Failed to configure notifications")?;

    let port = config.port;
    let app = web::router(AppState::new(config, notifier));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "contact_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("contact_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("contact_server_shutting_down");
}
