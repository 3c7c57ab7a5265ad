use crate::cleanup::CleanupScheduler;
use crate::config::Config;
use crate::config_validator::ConfigValidator;
use crate::error::ThrottlerResult;
use crate::handlers::{create_order, health_check, stats, AppState};
use crate::middleware::{logging_middleware, order_limit_middleware, request_limit_middleware};
use crate::rate_limiter::RateLimiter;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router. The request limiter covers every route; the order
/// limiter additionally covers order creation.
pub fn create_app(state: AppState) -> Router {
    let orders = Router::new()
        .route("/orders", post(create_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            order_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .merge(orders)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    logging_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    request_limit_middleware,
                )),
        )
        .with_state(state)
}

pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    pub fn new(config: Config) -> ThrottlerResult<Self> {
        ConfigValidator::validate_config(&config)?;
        let rate_limiter = Arc::new(RateLimiter::new(&config)?);

        Ok(Self {
            config,
            state: AppState::new(rate_limiter),
        })
    }

    pub async fn run(self) -> ThrottlerResult<()> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        let scheduler = CleanupScheduler::spawn(
            Arc::clone(&self.state.rate_limiter),
            self.config.cleanup_interval(),
        );

        tracing::info!("Throttler server listening on {}", self.config.bind_addr);
        tracing::info!("Health check available at /health");

        let app = create_app(self.state);

        // Run server with graceful shutdown
        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        scheduler.shutdown().await;
        tracing::info!("Cleanup scheduler stopped, server shut down");

        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
