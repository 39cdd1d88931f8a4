mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use aramdb_acquisition::AcquisitionService;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = aramdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let service = Arc::new(AcquisitionService::from_config(&config)?);
    service.start().await;

    // Warm the cache so the first client request is not a cold fetch.
    let warmup = Arc::clone(&service);
    tokio::spawn(async move {
        match warmup.read().await {
            Ok(result) => tracing::info!(
                champions = result.champions_count(),
                origin = %result.origin,
                "startup warmup complete"
            ),
            Err(e) => tracing::warn!(error = %e, "startup warmup failed"),
        }
    });

    let auth = AuthState::from_env(matches!(
        config.env,
        aramdb_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            service: Arc::clone(&service),
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "aramdb-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
