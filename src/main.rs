use std::sync::Arc;

use subscription_bridge::adapters::{
    app_router, BillingAppState, FileDeadLetterLog, PostgrestProfileStore, StripeConfig,
    StripePaymentAdapter, TracingDeadLetterLog,
};
use subscription_bridge::config::AppConfig;
use subscription_bridge::ports::DeadLetterLog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load and validate configuration
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let addr = config.server.socket_addr()?;
    tracing::info!(
        environment = ?config.server.environment,
        stripe_live = config.payment.is_live_mode(),
        livemode_required = config.payment.require_livemode,
        "Starting subscription bridge"
    );
    if config.is_production() && config.payment.is_test_mode() {
        tracing::warn!("Production environment is configured with a Stripe test key");
    }

    // Wire adapters
    let payment_provider = Arc::new(StripePaymentAdapter::new(
        StripeConfig::from_payment_config(&config.payment),
    ));
    let profile_store = Arc::new(PostgrestProfileStore::new(&config.profile_store));
    let dead_letter_log: Arc<dyn DeadLetterLog> = match &config.dead_letter.path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Recording dead letters to file");
            Arc::new(FileDeadLetterLog::new(path))
        }
        None => Arc::new(TracingDeadLetterLog::new()),
    };

    let state = BillingAppState::new(payment_provider, profile_store, dead_letter_log)
        .with_public_app_url(config.server.public_app_url().map(str::to_string));
    let app = app_router(state, &config.server);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
